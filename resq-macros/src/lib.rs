//! Proc macros for resq job classes
//!
//! This crate provides macros to turn async functions into registered job classes.

use proc_macro::TokenStream;
use quote::quote;
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::{parse_macro_input, Ident, ItemFn, LitStr, Token};

fn wrapper_ident(fn_name: &Ident) -> Ident {
    Ident::new(&format!("{}Wrapper", fn_name), fn_name.span())
}

/// Attribute macro to convert an async function into a job class
///
/// The function receives the job's argument list and returns a
/// `resq::processor::JobResult`. The macro generates a `<fn>Wrapper` type
/// implementing `Handler`, with a `class()` constructor returning the
/// `JobClass`.
///
/// Attributes:
/// - `queue = "..."`: queue used by `Client::enqueue`
/// - `name = "..."`: class name (defaults to the function name)
///
/// # Example
///
/// ```ignore
/// use resq::processor::JobResult;
/// use resq_macros::job;
/// use serde_json::{json, Value};
///
/// #[job(queue = "file_serve", name = "Archive")]
/// async fn archive(args: Vec<Value>) -> JobResult {
///     Ok(json!({ "archived": args }))
/// }
///
/// // Later, register the class:
/// let registry = resq::processor::Registry::from_classes([archiveWrapper::class()])?;
/// ```
#[proc_macro_attribute]
pub fn job(args: TokenStream, input: TokenStream) -> TokenStream {
    let mut queue: Option<LitStr> = None;
    let mut name: Option<LitStr> = None;

    let attr_parser = syn::meta::parser(|meta| {
        if meta.path.is_ident("queue") {
            queue = Some(meta.value()?.parse()?);
            Ok(())
        } else if meta.path.is_ident("name") {
            name = Some(meta.value()?.parse()?);
            Ok(())
        } else {
            Err(meta.error("unsupported job attribute, expected `queue` or `name`"))
        }
    });
    parse_macro_input!(args with attr_parser);

    let input_fn = parse_macro_input!(input as ItemFn);

    // Validate function signature
    if input_fn.sig.asyncness.is_none() {
        return syn::Error::new_spanned(&input_fn.sig.fn_token, "job must be an async function")
            .to_compile_error()
            .into();
    }

    if input_fn.sig.inputs.len() != 1 {
        return syn::Error::new_spanned(
            &input_fn.sig.inputs,
            "job must take exactly one argument: the argument list",
        )
        .to_compile_error()
        .into();
    }

    let fn_name = &input_fn.sig.ident;
    let fn_vis = &input_fn.vis;
    let wrapper_name = wrapper_ident(fn_name);

    let class_name = name.unwrap_or_else(|| LitStr::new(&fn_name.to_string(), fn_name.span()));
    let with_queue = queue.map(|queue| quote! { .queue(#queue) });

    let expanded = quote! {
        #input_fn

        #[allow(non_camel_case_types)]
        #[derive(Clone, Copy, Default)]
        #fn_vis struct #wrapper_name;

        #[::resq::async_trait]
        impl ::resq::processor::Handler for #wrapper_name {
            async fn perform(
                &self,
                args: &[::serde_json::Value],
            ) -> ::resq::processor::JobResult {
                #fn_name(args.to_vec()).await
            }
        }

        #[automatically_derived]
        impl #wrapper_name {
            /// Job class descriptor for this function
            #fn_vis fn class() -> ::resq::processor::JobClass {
                ::resq::processor::JobClass::new(#class_name)
                    #with_queue
                    .perform(#wrapper_name)
            }
        }
    };

    TokenStream::from(expanded)
}

/// Macro to build a registry from `#[job]` functions
///
/// Expands to `Registry::from_classes(...)`, a `resq::Result<Registry>`.
///
/// # Example
///
/// ```ignore
/// use resq_macros::{job, register_jobs};
///
/// let registry = register_jobs!(archive, send_email)?;
/// ```
#[proc_macro]
pub fn register_jobs(input: TokenStream) -> TokenStream {
    let parser = Punctuated::<Ident, Token![,]>::parse_terminated;
    let jobs = match parser.parse(input) {
        Ok(jobs) => jobs,
        Err(e) => return e.to_compile_error().into(),
    };

    let classes = jobs.iter().map(|job| {
        let wrapper_name = wrapper_ident(job);
        quote! { #wrapper_name::class() }
    });

    let expanded = quote! {
        ::resq::processor::Registry::from_classes(::std::vec![#(#classes),*])
    };

    TokenStream::from(expanded)
}

/// Helper macro returning the job class of a `#[job]` function
///
/// # Example
///
/// ```ignore
/// use resq_macros::{job, job_class};
///
/// let client = resq::Client::builder()
///     .register(job_class!(archive))?
///     .build()
///     .await?;
/// ```
#[proc_macro]
pub fn job_class(input: TokenStream) -> TokenStream {
    let job_fn = parse_macro_input!(input as Ident);
    let wrapper_name = wrapper_ident(&job_fn);

    let expanded = quote! {
        #wrapper_name::class()
    };

    TokenStream::from(expanded)
}
