use std::borrow::Cow;

use crate::{
    metadata::view::{MetadataView, MethodRow},
    Result,
};

/// Builds the dotted name a method is reported under.
///
/// The name is `namespace.Outer.Inner.Method`: the namespace of the outermost enclosing
/// type, every type name from the outside in, then the method name. Empty and
/// whitespace-only parts are left out, so a type without namespace yields `Type.Method`.
///
/// # Errors
/// Returns [`crate::Error::InvalidContainer`] if the declaring type or one of its enclosing
/// types does not exist or the nesting chain does not end, and
/// [`crate::Error::TruncatedMetadata`] if a name lies outside the `#Strings` heap.
pub fn qualified_name(view: &MetadataView<'_>, method: &MethodRow) -> Result<String> {
    let strings = view.strings();
    let types = view.type_rows();

    let mut parts: Vec<Cow<'_, str>> = vec![strings.resolve(method.name)?];

    let mut current = method.declaring_type;
    let mut steps = 0_usize;
    let outermost = loop {
        let Some(row) = view.type_row(current) else {
            return Err(invalid_container!(
                "Method {} refers to missing type index {}",
                method.token,
                current
            ));
        };

        steps += 1;
        if steps > types.len() {
            return Err(invalid_container!(
                "Nesting chain of method {} does not terminate",
                method.token
            ));
        }

        parts.push(strings.resolve(row.name)?);
        match row.enclosing_type {
            Some(enclosing) => current = enclosing,
            None => break row,
        }
    };
    parts.push(strings.resolve(outermost.namespace)?);

    let name = parts
        .iter()
        .rev()
        .filter(|part| !part.trim().is_empty())
        .map(|part| &**part)
        .collect::<Vec<&str>>()
        .join(".");

    Ok(name)
}
