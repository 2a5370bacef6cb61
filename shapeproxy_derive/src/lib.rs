use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Ident, LitStr, Type, parse_macro_input, spanned::Spanned};

/// Implements `PropertySource` and `PropertyTarget` for a struct with named
/// fields, so plain records can feed proxies or be populated like them.
///
/// Field options:
/// - `#[record(name = "...")]` exposes the field under another property name;
/// - `#[record(skip)]` hides the field.
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_record(input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

#[derive(Default)]
struct RecordFieldOptions {
    property_name: Option<String>,
    skip: bool,
}

struct RecordField {
    ident: Ident,
    ty: Type,
    property_name: String,
}

fn expand_record(input: DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            input.generics,
            "Record does not support generic structs",
        ));
    }

    let data_struct = match input.data {
        Data::Struct(data) => data,
        _ => {
            return Err(syn::Error::new(
                struct_name.span(),
                "Record can only be derived for structs",
            ));
        }
    };

    let named_fields = match data_struct.fields {
        Fields::Named(fields) => fields,
        _ => {
            return Err(syn::Error::new(
                struct_name.span(),
                "Record requires named fields",
            ));
        }
    };

    let mut fields = Vec::<RecordField>::new();
    for field in named_fields.named {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new(field.span(), "Record requires named fields"))?;
        let options = parse_record_field_options(&field.attrs)?;
        if options.skip {
            continue;
        }

        let property_name = options
            .property_name
            .unwrap_or_else(|| ident.to_string());
        if fields.iter().any(|existing| existing.property_name == property_name) {
            return Err(syn::Error::new(
                field.span(),
                format!("Duplicate record property name '{}'", property_name),
            ));
        }

        fields.push(RecordField {
            ident,
            ty: field.ty,
            property_name,
        });
    }

    let type_label = struct_name.to_string();
    let names = fields
        .iter()
        .map(|field| field.property_name.as_str())
        .collect::<Vec<_>>();

    let read_arms = fields.iter().map(|field| {
        let ident = &field.ident;
        let name = field.property_name.as_str();
        quote! {
            #name => ::std::option::Option::Some(::shapeproxy::ProxyValue::into_value(
                ::std::clone::Clone::clone(&self.#ident),
            )),
        }
    });

    let write_arms = fields.iter().map(|field| {
        let ident = &field.ident;
        let ty = &field.ty;
        let name = field.property_name.as_str();
        quote! {
            #name => {
                self.#ident = <#ty as ::shapeproxy::ProxyValue>::from_slot(#name, &value)?;
                ::std::result::Result::Ok(())
            }
        }
    });

    let has_property = if names.is_empty() {
        quote!(false)
    } else {
        quote!(matches!(name, #(#names)|*))
    };

    Ok(quote! {
        impl ::shapeproxy::PropertySource for #struct_name {
            fn readable_properties(&self) -> ::std::vec::Vec<&str> {
                ::std::vec![#(#names),*]
            }

            fn read_property(&self, name: &str) -> ::std::option::Option<::shapeproxy::Value> {
                match name {
                    #(#read_arms)*
                    _ => ::std::option::Option::None,
                }
            }
        }

        impl ::shapeproxy::PropertyTarget for #struct_name {
            fn settable_properties(&self) -> ::std::vec::Vec<::std::string::String> {
                ::std::vec![#(::std::string::String::from(#names)),*]
            }

            fn has_property(&self, name: &str) -> bool {
                #has_property
            }

            #[allow(unused_variables)]
            fn write_property(
                &mut self,
                name: &str,
                value: ::shapeproxy::Value,
            ) -> ::shapeproxy::Result<()> {
                match name {
                    #(#write_arms)*
                    _ => ::std::result::Result::Err(::shapeproxy::ProxyError::UnknownProperty {
                        type_name: ::std::string::String::from(#type_label),
                        property: ::std::string::String::from(name),
                    }),
                }
            }
        }
    })
}

fn parse_record_field_options(attrs: &[syn::Attribute]) -> syn::Result<RecordFieldOptions> {
    let mut options = RecordFieldOptions::default();

    for attr in attrs {
        if !attr.path().is_ident("record") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                options.skip = true;
                return Ok(());
            }

            if meta.path.is_ident("name") {
                let value = meta.value()?;
                let lit: LitStr = value.parse()?;
                options.property_name = Some(lit.value());
                return Ok(());
            }

            Err(meta.error(
                "Unsupported #[record(...)] option. Supported: skip, name = \"...\"",
            ))
        })?;
    }

    if options.skip && options.property_name.is_some() {
        return Err(syn::Error::new(
            proc_macro2::Span::call_site(),
            "#[record(skip)] cannot define a property name",
        ));
    }

    Ok(options)
}
