use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitFloat, LitInt, LitStr};

/// Derive macro for `pwcode::RecordShape`.
///
/// Reads per-field attributes and generates a `FieldDirective` for each
/// field at macro-expansion time, which is handed to
/// `FieldCoding::from_directive` inside the generated `fields()` body —
/// a declarative coding surface resolved by the compiler rather than a
/// runtime string parser.
///
/// Recognized attributes:
/// - `#[step(min = .., max = .., step = .., bits = .., clamped)]` — numeric
///   coding. `bits` is mutually exclusive with `max`/`step` shorthand.
/// - `#[enum_values("A", "B", ...)]` — field is a clamped enum over these
///   members; the field's Rust type must be `String`.
/// - `#[time]` — field uses the default Unix-millisecond time coding
///   (`pwcode::default_time_coding`); mutually exclusive with `#[step]`.
/// - `#[const_value(42.0)]`, `#[omit]`, `#[inf(pos = .., neg = ..)]`,
///   `#[meta(unit = "..", caption = "..", accuracy = .., accuracy_field = "..",
///   max_interval_ns = .., bandwidth = ..)]` — layered onto whichever coding
///   the field otherwise resolves to. `accuracy` and `accuracy_field` are
///   mutually exclusive (literal value vs. naming a sibling field).
///
/// Multi-segment explicit step schedules have no attribute syntax here;
/// implement `RecordShape` by hand for those fields (see the trait's doc
/// comment).
#[proc_macro_derive(
    RecordShape,
    attributes(step, enum_values, time, const_value, omit, inf, meta)
)]
pub fn derive_record_shape(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    let fields = match &input.data {
        Data::Struct(data_struct) => match &data_struct.fields {
            Fields::Named(fields) => fields,
            _ => panic!("RecordShape only supports structs with named fields"),
        },
        _ => panic!("RecordShape can only be derived for structs"),
    };

    let parsed: Vec<ParsedField> = fields.named.iter().map(ParsedField::from_syn).collect();

    let descriptor_pushes = parsed.iter().map(ParsedField::descriptor_push);
    let get_arms = parsed.iter().map(ParsedField::get_arm);
    let set_arms = parsed.iter().map(ParsedField::set_arm);

    let expanded = quote! {
        impl pwcode::RecordShape for #name {
            fn fields() -> ::std::vec::Vec<pwcode::FieldDescriptor> {
                let mut out = ::std::vec::Vec::new();
                #(#descriptor_pushes)*
                out
            }

            fn get(&self, name: &str) -> ::std::option::Option<pwcode::Value> {
                match name {
                    #(#get_arms)*
                    _ => ::std::option::Option::None,
                }
            }

            fn set(&mut self, name: &str, value: pwcode::Value) -> ::std::result::Result<(), pwcode::Error> {
                match name {
                    #(#set_arms)*
                    _ => return ::std::result::Result::Err(pwcode::Error::UnknownField(name.to_string())),
                }
                ::std::result::Result::Ok(())
            }
        }
    };

    TokenStream::from(expanded)
}

/// What an attribute-annotated field resolves to: which coding to build,
/// plus the shared modifiers (`const_value`, `omit`, `inf`, `meta`) that
/// layer on top of any of them.
struct ParsedField {
    ident: syn::Ident,
    ty_name: String,
    kind: FieldKind,
    const_value: Option<LitFloat>,
    omit: bool,
    inf_pos: Option<LitFloat>,
    inf_neg: Option<LitFloat>,
    meta_unit: Option<LitStr>,
    meta_caption: Option<LitStr>,
    meta_accuracy: Option<LitFloat>,
    meta_accuracy_field: Option<LitStr>,
    meta_max_interval_ns: Option<LitInt>,
    meta_bandwidth: Option<LitFloat>,
}

enum FieldKind {
    Numeric {
        min: Option<LitFloat>,
        max: Option<LitFloat>,
        step: Option<LitFloat>,
        bits: Option<LitInt>,
        clamped: bool,
    },
    Enum {
        values: Vec<LitStr>,
    },
    Time,
}

impl ParsedField {
    fn from_syn(field: &syn::Field) -> Self {
        let ident = field
            .ident
            .clone()
            .expect("RecordShape only supports named fields");
        let ty_name = type_name_of(&field.ty);

        let mut numeric_min = None;
        let mut numeric_max = None;
        let mut numeric_step = None;
        let mut numeric_bits = None;
        let mut numeric_clamped = false;
        let mut enum_values: Option<Vec<LitStr>> = None;
        let mut is_time = false;
        let mut const_value = None;
        let mut omit = false;
        let mut inf_pos = None;
        let mut inf_neg = None;
        let mut meta_unit = None;
        let mut meta_caption = None;
        let mut meta_accuracy = None;
        let mut meta_accuracy_field = None;
        let mut meta_max_interval_ns = None;
        let mut meta_bandwidth = None;

        for attr in &field.attrs {
            if attr.path().is_ident("step") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("clamped") {
                        numeric_clamped = true;
                        return Ok(());
                    }
                    let value = meta.value()?;
                    if meta.path.is_ident("min") {
                        numeric_min = Some(value.parse()?);
                    } else if meta.path.is_ident("max") {
                        numeric_max = Some(value.parse()?);
                    } else if meta.path.is_ident("step") {
                        numeric_step = Some(value.parse()?);
                    } else if meta.path.is_ident("bits") {
                        numeric_bits = Some(value.parse()?);
                    } else {
                        return Err(meta.error("unrecognized key in #[step(...)]"));
                    }
                    Ok(())
                })
                .expect("malformed #[step(...)] attribute");
            } else if attr.path().is_ident("enum_values") {
                let values = attr
                    .parse_args_with(
                        syn::punctuated::Punctuated::<LitStr, syn::Token![,]>::parse_terminated,
                    )
                    .expect("malformed #[enum_values(...)] attribute");
                enum_values = Some(values.into_iter().collect());
            } else if attr.path().is_ident("time") {
                is_time = true;
            } else if attr.path().is_ident("const_value") {
                const_value = Some(
                    attr.parse_args::<LitFloat>()
                        .expect("malformed #[const_value(...)] attribute"),
                );
            } else if attr.path().is_ident("omit") {
                omit = true;
            } else if attr.path().is_ident("inf") {
                attr.parse_nested_meta(|meta| {
                    let value = meta.value()?;
                    if meta.path.is_ident("pos") {
                        inf_pos = Some(value.parse()?);
                    } else if meta.path.is_ident("neg") {
                        inf_neg = Some(value.parse()?);
                    } else {
                        return Err(meta.error("unrecognized key in #[inf(...)]"));
                    }
                    Ok(())
                })
                .expect("malformed #[inf(...)] attribute");
            } else if attr.path().is_ident("meta") {
                attr.parse_nested_meta(|meta| {
                    let value = meta.value()?;
                    if meta.path.is_ident("unit") {
                        meta_unit = Some(value.parse()?);
                    } else if meta.path.is_ident("caption") {
                        meta_caption = Some(value.parse()?);
                    } else if meta.path.is_ident("accuracy") {
                        meta_accuracy = Some(value.parse()?);
                    } else if meta.path.is_ident("accuracy_field") {
                        meta_accuracy_field = Some(value.parse()?);
                    } else if meta.path.is_ident("max_interval_ns") {
                        meta_max_interval_ns = Some(value.parse()?);
                    } else if meta.path.is_ident("bandwidth") {
                        meta_bandwidth = Some(value.parse()?);
                    } else {
                        return Err(meta.error("unrecognized key in #[meta(...)]"));
                    }
                    Ok(())
                })
                .expect("malformed #[meta(...)] attribute");
            }
        }

        let kind = if let Some(values) = enum_values {
            FieldKind::Enum { values }
        } else if is_time {
            FieldKind::Time
        } else {
            FieldKind::Numeric {
                min: numeric_min,
                max: numeric_max,
                step: numeric_step,
                bits: numeric_bits,
                clamped: numeric_clamped,
            }
        };

        ParsedField {
            ident,
            ty_name,
            kind,
            const_value,
            omit,
            inf_pos,
            inf_neg,
            meta_unit,
            meta_caption,
            meta_accuracy,
            meta_accuracy_field,
            meta_max_interval_ns,
            meta_bandwidth,
        }
    }

    fn directive_expr(&self) -> proc_macro2::TokenStream {
        let const_value = opt_lit(&self.const_value);
        let omit = self.omit;
        let inf_pos = opt_lit(&self.inf_pos);
        let inf_neg = opt_lit(&self.inf_neg);
        let meta_unit = self
            .meta_unit
            .as_ref()
            .map(|l| quote! { #l.to_string() })
            .unwrap_or_else(|| quote! { ::std::string::String::new() });
        let meta_caption = self
            .meta_caption
            .as_ref()
            .map(|l| quote! { #l.to_string() })
            .unwrap_or_else(|| quote! { ::std::string::String::new() });
        let meta_accuracy = if let Some(l) = &self.meta_accuracy {
            quote! { ::std::option::Option::Some(pwcode::Accuracy::Value(#l as f64)) }
        } else if let Some(l) = &self.meta_accuracy_field {
            quote! { ::std::option::Option::Some(pwcode::Accuracy::SiblingField(#l.to_string())) }
        } else {
            quote! { ::std::option::Option::None }
        };
        let meta_max_interval_ns = match &self.meta_max_interval_ns {
            Some(l) => quote! { ::std::option::Option::Some(#l as u64) },
            None => quote! { ::std::option::Option::None },
        };
        let meta_bandwidth = match &self.meta_bandwidth {
            Some(l) => quote! { ::std::option::Option::Some(#l as f64) },
            None => quote! { ::std::option::Option::None },
        };

        let (steps_body, enums_body) = match &self.kind {
            FieldKind::Numeric {
                min,
                max,
                step,
                bits,
                clamped,
            } => {
                let min = opt_lit(min);
                let max = opt_lit(max);
                let step = opt_lit(step);
                let bits = match bits {
                    Some(l) => quote! { ::std::option::Option::Some(#l as u32) },
                    None => quote! { ::std::option::Option::None },
                };
                (
                    quote! {
                        min: #min,
                        max: #max,
                        step: #step,
                        bits: #bits,
                        clamped: #clamped,
                    },
                    quote! { enums: ::std::vec::Vec::new(), },
                )
            }
            FieldKind::Enum { values } => (
                quote! { clamped: true, },
                quote! {
                    enums: ::std::vec![#(#values.to_string()),*],
                },
            ),
            FieldKind::Time => (quote! {}, quote! { enums: ::std::vec::Vec::new(), }),
        };

        quote! {
            pwcode::FieldDirective {
                #steps_body
                #enums_body
                const_value: #const_value,
                omit: #omit,
                inf_pos: #inf_pos,
                inf_neg: #inf_neg,
                meta: pwcode::FieldMeta {
                    unit: #meta_unit,
                    caption: #meta_caption,
                    accuracy: #meta_accuracy,
                    max_interval_ns: #meta_max_interval_ns,
                    bandwidth: #meta_bandwidth,
                },
                ..::std::default::Default::default()
            }
        }
    }

    fn descriptor_push(&self) -> proc_macro2::TokenStream {
        let ident = &self.ident;
        let name = ident.to_string();
        let type_tag = self.type_tag();

        let coding = match &self.kind {
            FieldKind::Time => {
                quote! {
                    pwcode::default_time_coding(#name)
                        .expect("invalid default time coding")
                }
            }
            _ => {
                let directive = self.directive_expr();
                quote! {
                    pwcode::FieldCoding::from_directive(#name, #directive)
                        .expect("invalid field coding declared via #[derive(RecordShape)]")
                }
            }
        };

        quote! {
            out.push(pwcode::FieldDescriptor {
                name: #name.to_string(),
                type_tag: #type_tag,
                coding: #coding,
            });
        }
    }

    fn type_tag(&self) -> proc_macro2::TokenStream {
        if matches!(self.kind, FieldKind::Time) {
            return quote! { pwcode::TypeTag::Time };
        }
        if matches!(self.kind, FieldKind::Enum { .. }) {
            return quote! { pwcode::TypeTag::String };
        }
        match self.ty_name.as_str() {
            "f32" => quote! { pwcode::TypeTag::F32 },
            "f64" => quote! { pwcode::TypeTag::F64 },
            "i8" => quote! { pwcode::TypeTag::I8 },
            "i16" => quote! { pwcode::TypeTag::I16 },
            "i32" => quote! { pwcode::TypeTag::I32 },
            "i64" => quote! { pwcode::TypeTag::I64 },
            "u8" => quote! { pwcode::TypeTag::U8 },
            "u16" => quote! { pwcode::TypeTag::U16 },
            "u32" => quote! { pwcode::TypeTag::U32 },
            "u64" => quote! { pwcode::TypeTag::U64 },
            "bool" => quote! { pwcode::TypeTag::Bool },
            "String" => quote! { pwcode::TypeTag::String },
            other => panic!("RecordShape: unsupported field type {other}"),
        }
    }

    fn get_arm(&self) -> proc_macro2::TokenStream {
        let ident = &self.ident;
        let name = ident.to_string();

        let value_expr = if matches!(self.kind, FieldKind::Enum { .. }) {
            quote! { pwcode::Value::Str(self.#ident.clone()) }
        } else if matches!(self.kind, FieldKind::Time) {
            quote! { pwcode::Value::Time(self.#ident as i64) }
        } else {
            match self.ty_name.as_str() {
                "bool" => quote! { pwcode::Value::Bool(self.#ident) },
                "String" => quote! { pwcode::Value::Str(self.#ident.clone()) },
                "i64" | "i32" | "i16" | "i8" => {
                    quote! { pwcode::Value::I64(self.#ident as i64) }
                }
                "u64" | "u32" | "u16" | "u8" => {
                    quote! { pwcode::Value::U64(self.#ident as u64) }
                }
                _ => quote! { pwcode::Value::F64(self.#ident as f64) },
            }
        };

        quote! {
            #name => ::std::option::Option::Some(#value_expr),
        }
    }

    fn set_arm(&self) -> proc_macro2::TokenStream {
        let ident = &self.ident;
        let name = ident.to_string();

        let assign = if matches!(self.kind, FieldKind::Enum { .. }) {
            quote! {
                self.#ident = match value {
                    pwcode::Value::Str(s) => s,
                    other => other.as_str().unwrap_or_default().to_string(),
                };
            }
        } else if matches!(self.kind, FieldKind::Time) {
            quote! {
                self.#ident = match value {
                    pwcode::Value::Time(ms) => ms,
                    other => other.as_f64() as i64,
                };
            }
        } else {
            match self.ty_name.as_str() {
                "bool" => quote! {
                    self.#ident = match value {
                        pwcode::Value::Bool(b) => b,
                        other => other.as_f64() != 0.0,
                    };
                },
                "String" => quote! {
                    self.#ident = match value {
                        pwcode::Value::Str(s) => s,
                        other => other.as_str().unwrap_or_default().to_string(),
                    };
                },
                ty => {
                    let ty_ident = syn::Ident::new(ty, proc_macro2::Span::call_site());
                    quote! {
                        self.#ident = value.as_f64() as #ty_ident;
                    }
                }
            }
        };

        quote! {
            #name => { #assign }
        }
    }
}

fn type_name_of(ty: &syn::Type) -> String {
    if let syn::Type::Path(type_path) = ty {
        if let Some(segment) = type_path.path.segments.last() {
            return segment.ident.to_string();
        }
    }
    quote!(#ty).to_string()
}

fn opt_lit<T: quote::ToTokens>(lit: &Option<T>) -> proc_macro2::TokenStream {
    match lit {
        Some(l) => quote! { ::std::option::Option::Some(#l as f64) },
        None => quote! { ::std::option::Option::None },
    }
}
