//! 组合模块登记宏实现

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::{
    parse::Parse, parse::ParseStream, parse_macro_input, punctuated::Punctuated, Error, Expr,
    Ident, ItemStruct, Meta, Path, Result, Token, Type,
};

/// 宏参数
#[derive(Default)]
pub struct DiscoverableArgs {
    pub registrator: bool,
    pub plain: bool,
    pub hierarchical: bool,
    pub bootstrapper: bool,
    /// `ContainerModule<C>` 的容器类型
    pub containers: Vec<Type>,
    /// 额外声明的契约
    pub contracts: Vec<Type>,
    pub constructor: Option<Path>,
}

impl DiscoverableArgs {
    fn declares_module(&self) -> bool {
        self.registrator
            || self.plain
            || self.hierarchical
            || self.bootstrapper
            || !self.containers.is_empty()
    }
}

impl Parse for DiscoverableArgs {
    fn parse(input: ParseStream) -> Result<Self> {
        let mut args = DiscoverableArgs::default();

        let parsed = Punctuated::<Meta, Token![,]>::parse_terminated(input)?;

        for meta in parsed {
            match meta {
                Meta::Path(path) => {
                    if path.is_ident("registrator") {
                        args.registrator = true;
                    } else if path.is_ident("plain") {
                        args.plain = true;
                    } else if path.is_ident("hierarchical") {
                        args.hierarchical = true;
                    } else if path.is_ident("bootstrapper") {
                        args.bootstrapper = true;
                    } else {
                        return Err(Error::new_spanned(path, "未知的模块类型"));
                    }
                }
                Meta::List(list) => {
                    let types = list.parse_args_with(Punctuated::<Type, Token![,]>::parse_terminated)?;
                    if list.path.is_ident("container") {
                        args.containers.extend(types);
                    } else if list.path.is_ident("implements") {
                        args.contracts.extend(types);
                    } else {
                        return Err(Error::new_spanned(list.path, "未知的参数"));
                    }
                }
                Meta::NameValue(nv) => {
                    if !nv.path.is_ident("constructor") {
                        return Err(Error::new_spanned(nv.path, "未知的参数"));
                    }
                    match nv.value {
                        Expr::Path(expr_path) => args.constructor = Some(expr_path.path),
                        other => {
                            return Err(Error::new_spanned(other, "constructor 需要函数路径"))
                        }
                    }
                }
            }
        }

        Ok(args)
    }
}

/// 实现 #[discoverable] 宏
pub fn discoverable_impl(args: TokenStream, input: TokenStream) -> TokenStream {
    let discoverable_args = if args.is_empty() {
        DiscoverableArgs::default()
    } else {
        match syn::parse::<DiscoverableArgs>(args) {
            Ok(args) => args,
            Err(e) => return e.to_compile_error().into(),
        }
    };

    let input_struct = parse_macro_input!(input as ItemStruct);
    if !input_struct.generics.params.is_empty() {
        return Error::new_spanned(&input_struct.generics, "不支持泛型类型")
            .to_compile_error()
            .into();
    }

    let registration_code = generate_registration_code(&input_struct.ident, &discoverable_args);

    let expanded = quote! {
        #input_struct

        #registration_code
    };

    TokenStream::from(expanded)
}

/// 生成启动时登记代码
fn generate_registration_code(
    struct_name: &Ident,
    args: &DiscoverableArgs,
) -> proc_macro2::TokenStream {
    let registration_fn_name = Ident::new(
        &format!(
            "__register_composition_module_{}",
            struct_name.to_string().to_lowercase()
        ),
        Span::call_site(),
    );

    let builder = match (&args.constructor, args.declares_module()) {
        (Some(constructor), _) => quote! {
            ::infrastructure_composition::TypeEntry::concrete::<#struct_name>()
                .constructed_by(#constructor)
        },
        (None, true) => quote! {
            ::infrastructure_composition::TypeEntry::module::<#struct_name>()
        },
        (None, false) => quote! {
            ::infrastructure_composition::TypeEntry::concrete::<#struct_name>()
        },
    };

    let mut module_contracts: Vec<proc_macro2::TokenStream> = Vec::new();
    if args.registrator {
        module_contracts.push(quote! { dyn ::infrastructure_composition::RegistratorModule });
    }
    if args.plain {
        module_contracts.push(quote! { dyn ::infrastructure_composition::PlainModule });
    }
    if args.hierarchical {
        module_contracts.push(quote! { dyn ::infrastructure_composition::HierarchicalModule });
    }
    for container in &args.containers {
        module_contracts
            .push(quote! { dyn ::infrastructure_composition::ContainerModule<#container> });
    }
    if args.bootstrapper {
        module_contracts.push(quote! { dyn ::infrastructure_composition::BootstrapperModule });
    }

    let casts = module_contracts.iter().map(|contract| {
        quote! {
            .as_module::<#contract>(
                |module: ::std::sync::Arc<#struct_name>| -> ::std::sync::Arc<#contract> { module }
            )
        }
    });
    let contracts = args.contracts.iter().map(|contract| {
        quote! { .implements::<#contract>() }
    });

    quote! {
        // 使用 ctor 在程序启动时登记到程序集注册表
        #[ctor::ctor]
        fn #registration_fn_name() {
            ::infrastructure_composition::register_type(
                env!("CARGO_PKG_NAME"),
                #builder
                    #(#contracts)*
                    #(#casts)*
                    .build(),
            );
        }
    }
}
