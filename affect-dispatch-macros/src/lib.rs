//! Procedural macros for affect-dispatch

use darling::{FromDeriveInput, FromMeta, FromVariant};
use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

/// Container-level attributes for #[derive(Action)]
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(action), supports(enum_any))]
struct ActionOpts {
    ident: syn::Ident,
    generics: syn::Generics,
    data: darling::ast::Data<ActionVariant, ()>,

    /// Case convention applied to every variant name
    #[darling(default)]
    rename_all: Option<RenameRule>,
}

/// Variant-level attributes
#[derive(Debug, FromVariant)]
#[darling(attributes(action))]
struct ActionVariant {
    ident: syn::Ident,
    fields: darling::ast::Fields<()>,

    /// Explicit name override
    #[darling(default)]
    rename: Option<String>,
}

#[derive(Debug, Clone, Copy)]
enum RenameRule {
    ScreamingSnake,
    Snake,
    Kebab,
    Pascal,
}

impl FromMeta for RenameRule {
    fn from_string(value: &str) -> darling::Result<Self> {
        match value {
            "SCREAMING_SNAKE_CASE" => Ok(Self::ScreamingSnake),
            "snake_case" => Ok(Self::Snake),
            "kebab-case" => Ok(Self::Kebab),
            "PascalCase" => Ok(Self::Pascal),
            other => Err(darling::Error::unknown_value(other)),
        }
    }
}

impl RenameRule {
    fn apply(self, variant: &str) -> String {
        match self {
            Self::Pascal => variant.to_string(),
            Self::Snake => to_snake_case(variant),
            Self::ScreamingSnake => to_snake_case(variant).to_uppercase(),
            Self::Kebab => to_snake_case(variant).replace('_', "-"),
        }
    }
}

/// Split a PascalCase string into parts, starting a new part at each
/// uppercase letter and where a run of digits follows a letter
fn split_pascal_case(s: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut prev: Option<char> = None;

    for ch in s.chars() {
        let letter_to_digit = ch.is_ascii_digit() && prev.is_some_and(char::is_alphabetic);
        if (ch.is_uppercase() || letter_to_digit) && !current.is_empty() {
            parts.push(current);
            current = String::new();
        }
        current.push(ch);
        prev = Some(ch);
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

/// Convert PascalCase to snake_case
fn to_snake_case(s: &str) -> String {
    split_pascal_case(s)
        .iter()
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// Derive macro for the Action trait
///
/// Generates a `name()` method returning the variant's action type as a
/// static string. By default that is the variant name itself.
///
/// - `#[action(rename_all = "...")]` on the enum applies a case convention:
///   `"SCREAMING_SNAKE_CASE"`, `"snake_case"`, `"kebab-case"` or `"PascalCase"`.
/// - `#[action(rename = "...")]` on a variant sets its name explicitly and
///   wins over `rename_all`.
///
/// # Example
/// ```ignore
/// #[derive(Action, Clone, Debug)]
/// #[action(rename_all = "SCREAMING_SNAKE_CASE")]
/// enum Msg {
///     FetchStuff,
///     DidFetchStuff(Vec<u8>),
///     #[action(rename = "NoOp")]
///     Nothing,
/// }
///
/// assert_eq!(Msg::FetchStuff.name(), "FETCH_STUFF");
/// assert_eq!(Msg::Nothing.name(), "NoOp");
/// ```
#[proc_macro_derive(Action, attributes(action))]
pub fn derive_action(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let opts = match ActionOpts::from_derive_input(&input) {
        Ok(opts) => opts,
        Err(e) => return e.write_errors().into(),
    };

    let name = &opts.ident;
    let (impl_generics, ty_generics, where_clause) = opts.generics.split_for_impl();

    let variants = match &opts.data {
        darling::ast::Data::Enum(variants) => variants,
        _ => {
            return syn::Error::new_spanned(&input, "Action can only be derived for enums")
                .to_compile_error()
                .into();
        }
    };

    let name_arms = variants.iter().map(|v| {
        let variant_name = &v.ident;
        let variant_str = match (&v.rename, opts.rename_all) {
            (Some(explicit), _) => explicit.clone(),
            (None, Some(rule)) => rule.apply(&variant_name.to_string()),
            (None, None) => variant_name.to_string(),
        };

        match &v.fields.style {
            darling::ast::Style::Unit => quote! {
                #name::#variant_name => #variant_str
            },
            darling::ast::Style::Tuple => quote! {
                #name::#variant_name(..) => #variant_str
            },
            darling::ast::Style::Struct => quote! {
                #name::#variant_name { .. } => #variant_str
            },
        }
    });

    let expanded = quote! {
        impl #impl_generics affect_dispatch::Action for #name #ty_generics #where_clause {
            fn name(&self) -> &'static str {
                match self {
                    #(#name_arms),*
                }
            }
        }
    };

    TokenStream::from(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_pascal_case() {
        assert_eq!(split_pascal_case("FetchStuff"), vec!["Fetch", "Stuff"]);
        assert_eq!(split_pascal_case("Tick"), vec!["Tick"]);
    }

    #[test]
    fn test_split_before_digits() {
        assert_eq!(split_pascal_case("ChildAction1"), vec!["Child", "Action", "1"]);
        assert_eq!(split_pascal_case("Page12Loaded"), vec!["Page", "12", "Loaded"]);
        assert_eq!(RenameRule::ScreamingSnake.apply("ChildAction1"), "CHILD_ACTION_1");
        assert_eq!(RenameRule::Kebab.apply("ChildAction2"), "child-action-2");
    }

    #[test]
    fn test_rename_rules() {
        assert_eq!(RenameRule::ScreamingSnake.apply("DidFetchStuff"), "DID_FETCH_STUFF");
        assert_eq!(RenameRule::Snake.apply("DidFetchStuff"), "did_fetch_stuff");
        assert_eq!(RenameRule::Kebab.apply("DidFetchStuff"), "did-fetch-stuff");
        assert_eq!(RenameRule::Pascal.apply("DidFetchStuff"), "DidFetchStuff");
        assert_eq!(RenameRule::ScreamingSnake.apply("Increment"), "INCREMENT");
    }

    #[test]
    fn test_unknown_rule_is_rejected() {
        assert!(RenameRule::from_string("camelCase").is_err());
    }
}
