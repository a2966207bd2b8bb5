use proc_macro::TokenStream;

mod comp;
mod util;

#[proc_macro_derive(Comp, attributes(dynarch))]
pub fn comp(input: TokenStream) -> TokenStream {
    comp::derive(input.into()).unwrap_or_else(|err| err.to_compile_error()).into()
}
