use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{parse_macro_input, DeriveInput, Expr, ExprLit, ExprUnary, Lit, LitStr, UnOp};

/// Derives `DeclaredParams` for an operation type, generating its static
/// parameter table.
///
/// # Usage
///
/// ```ignore
/// #[derive(DeclaredParams)]
/// #[param(name = "id", required, kind = "integer")]
/// #[param(name = "limit", default = 25)]
/// struct GetUser;
/// ```
///
/// This will generate:
///
/// ```ignore
/// impl svc_command::DeclaredParams for GetUser {
///     const PARAMS: &'static [svc_command::ParamDescriptor] = &[
///         svc_command::ParamDescriptor { name: "id", required: true, default: None, kind: svc_command::ArgType::Integer },
///         svc_command::ParamDescriptor { name: "limit", required: false, default: Some(svc_command::StaticValue::Int(25)), kind: svc_command::ArgType::Any },
///     ];
/// }
/// ```
#[proc_macro_derive(DeclaredParams, attributes(param))]
pub fn derive_declared_params(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match expand(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let type_name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut params = Vec::new();
    for attr in &input.attrs {
        if attr.path().is_ident("param") {
            let param = extract_param(attr)?;
            if params
                .iter()
                .any(|p: &ParamAttr| p.name.value() == param.name.value())
            {
                return Err(syn::Error::new(
                    param.name.span(),
                    format!("duplicate #[param] named '{}'", param.name.value()),
                ));
            }
            params.push(param);
        }
    }

    let entries = params.iter().map(ParamAttr::to_tokens);

    Ok(quote! {
        impl #impl_generics ::svc_command::DeclaredParams for #type_name #ty_generics #where_clause {
            const PARAMS: &'static [::svc_command::ParamDescriptor] = &[
                #(#entries),*
            ];
        }
    })
}

/// One parsed #[param(...)] attribute
struct ParamAttr {
    name: LitStr,
    required: bool,
    default: Option<TokenStream2>,
    kind: TokenStream2,
}

impl ParamAttr {
    fn to_tokens(&self) -> TokenStream2 {
        let name = &self.name;
        let required = self.required;
        let kind = &self.kind;
        let default = match &self.default {
            Some(value) => quote! { ::core::option::Option::Some(#value) },
            None => quote! { ::core::option::Option::None },
        };

        quote! {
            ::svc_command::ParamDescriptor {
                name: #name,
                required: #required,
                default: #default,
                kind: #kind,
            }
        }
    }
}

/// Parse #[param(name = "...", required, default = <lit>, kind = "...")]
fn extract_param(attr: &syn::Attribute) -> syn::Result<ParamAttr> {
    let mut name = None;
    let mut required = false;
    let mut default = None;
    let mut kind = quote! { ::svc_command::ArgType::Any };

    attr.parse_nested_meta(|meta| {
        if meta.path.is_ident("name") {
            name = Some(meta.value()?.parse::<LitStr>()?);
            Ok(())
        } else if meta.path.is_ident("required") {
            required = true;
            Ok(())
        } else if meta.path.is_ident("default") {
            let expr: Expr = meta.value()?.parse()?;
            default = Some(static_value(&expr)?);
            Ok(())
        } else if meta.path.is_ident("kind") {
            let lit: LitStr = meta.value()?.parse()?;
            kind = arg_type(&lit)?;
            Ok(())
        } else {
            Err(meta.error(
                "expected `name`, `required`, `default` or `kind`",
            ))
        }
    })?;

    let name = name.ok_or_else(|| syn::Error::new_spanned(attr, "missing `name = \"...\"`"))?;

    Ok(ParamAttr {
        name,
        required,
        default,
        kind,
    })
}

/// Map a literal default onto a `StaticValue` constructor
fn static_value(expr: &Expr) -> syn::Result<TokenStream2> {
    match expr {
        Expr::Lit(ExprLit { lit, .. }) => match lit {
            Lit::Str(s) => Ok(quote! { ::svc_command::StaticValue::Str(#s) }),
            Lit::Int(i) => Ok(quote! { ::svc_command::StaticValue::Int(#i) }),
            Lit::Float(f) => Ok(quote! { ::svc_command::StaticValue::Float(#f) }),
            Lit::Bool(b) => Ok(quote! { ::svc_command::StaticValue::Bool(#b) }),
            other => Err(syn::Error::new_spanned(
                other,
                "default must be a string, integer, float or bool literal",
            )),
        },
        Expr::Unary(ExprUnary {
            op: UnOp::Neg(_),
            expr: inner,
            ..
        }) => match inner.as_ref() {
            Expr::Lit(ExprLit {
                lit: Lit::Int(i), ..
            }) => Ok(quote! { ::svc_command::StaticValue::Int(-#i) }),
            Expr::Lit(ExprLit {
                lit: Lit::Float(f), ..
            }) => Ok(quote! { ::svc_command::StaticValue::Float(-#f) }),
            other => Err(syn::Error::new_spanned(other, "expected a numeric literal")),
        },
        other => Err(syn::Error::new_spanned(other, "default must be a literal")),
    }
}

fn arg_type(lit: &LitStr) -> syn::Result<TokenStream2> {
    let variant = match lit.value().as_str() {
        "any" => quote! { Any },
        "string" => quote! { String },
        "integer" => quote! { Integer },
        "number" => quote! { Number },
        "boolean" => quote! { Boolean },
        "array" => quote! { Array },
        "object" => quote! { Object },
        other => {
            return Err(syn::Error::new(
                lit.span(),
                format!("unknown kind '{}'", other),
            ));
        }
    };
    Ok(quote! { ::svc_command::ArgType::#variant })
}
