use proc_macro2::Span;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{Error, Result};

/// The comma-separated options of one or more `#[dynarch(...)]` attributes.
pub(crate) struct Attr<T> {
    pub(crate) items: Vec<Named<T>>,
}

impl<T> Default for Attr<T> {
    fn default() -> Self { Self { items: Vec::new() } }
}

impl<T> Parse for Attr<T>
where
    Named<T>: Parse,
{
    fn parse(input: ParseStream) -> Result<Self> {
        let items = Punctuated::<Named<T>, syn::Token![,]>::parse_terminated(input)?;
        Ok(Self { items: items.into_iter().collect() })
    }
}

impl<T> Attr<T> {
    /// Returns the only option accepted by `matcher`, with the span of its name.
    ///
    /// Fails if more than one option is accepted.
    pub(crate) fn find_one<'t, U: 't>(
        &'t self,
        matcher: impl Fn(&'t T) -> Option<&'t U>,
    ) -> Result<Option<(Span, &'t U)>> {
        let mut found = None;
        for item in &self.items {
            if let Some(value) = matcher(&item.value) {
                if found.is_some() {
                    return Err(Error::new_spanned(
                        &item.name,
                        format!("Duplicate argument `{}`", item.name),
                    ));
                }
                found = Some((item.name.span(), value));
            }
        }
        Ok(found)
    }
}

/// An option value with the identifier that introduced it.
pub(crate) struct Named<T> {
    pub(crate) name:  syn::Ident,
    pub(crate) value: T,
}
