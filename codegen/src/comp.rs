use matches2::option_match;
use proc_macro2::TokenStream;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::{Error, Result};

use crate::util::{Attr, Named};

pub(crate) fn derive(input: TokenStream) -> Result<TokenStream> {
    let input: syn::DeriveInput = syn::parse2(input)?;

    let mut args: Attr<ItemOpt> = Attr::default();
    for attr in &input.attrs {
        if attr.path().is_ident("dynarch") {
            let this_args: Attr<ItemOpt> = attr.parse_args()?;
            args.items.extend(this_args.items);
        }
    }

    let crate_name = args
        .find_one(|opt| option_match!(opt, ItemOpt::DynarchAs(crate_name) => crate_name))?
        .map_or_else(|| quote!(::dynarch), |(_, crate_name)| crate_name.clone());

    let hash_fn = args.find_one(|opt| option_match!(opt, ItemOpt::Hash(path) => path))?.map(
        |(_, path)| {
            quote! {
                fn instance_hash(&self) -> #crate_name::comp::InstanceHash {
                    let hash: fn(&Self) -> #crate_name::comp::InstanceHash = #path;
                    hash(self)
                }
            }
        },
    );

    let snapshot_fn =
        args.find_one(|opt| option_match!(opt, ItemOpt::Serialize => &()))?.map(|_| {
            quote! {
                fn snapshot_value(&self) -> Option<#crate_name::_reexports::serde_json::Value> {
                    #crate_name::_reexports::serde_json::to_value(self).ok()
                }
            }
        });

    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics #crate_name::comp::Comp for #ident #ty_generics #where_clause {
            #hash_fn
            #snapshot_fn
        }
    })
}

enum ItemOpt {
    DynarchAs(TokenStream),
    Hash(syn::Path),
    Serialize,
}

impl Parse for Named<ItemOpt> {
    fn parse(input: ParseStream) -> Result<Self> {
        let name = input.parse::<syn::Ident>()?;

        let value = match name.to_string().as_str() {
            "dynarch_as" => {
                let inner;
                syn::parenthesized!(inner in input);
                ItemOpt::DynarchAs(inner.parse()?)
            }
            "hash" => {
                input.parse::<syn::Token![=]>()?;
                ItemOpt::Hash(input.parse()?)
            }
            "serialize" => ItemOpt::Serialize,
            _ => return Err(Error::new_spanned(&name, format!("Unknown argument `{}`", name))),
        };

        Ok(Named { name, value })
    }
}
