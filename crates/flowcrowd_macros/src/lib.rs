use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, FnArg, ItemFn};

/// Time a function when the `perf_stats` feature is enabled.
///
/// The body is wrapped with a drop guard that logs the elapsed time through
/// `bevy::log::info!` once the call takes longer than the threshold. With the
/// feature disabled the guard is compiled out entirely.
///
/// Methods (anything with a `self` receiver) are reported as
/// `Type::method` with generic arguments dropped, free functions by their
/// bare name. Method names resolve through
/// `crate::crowd::profiling::short_type_name`.
///
/// # Example
/// ```ignore
/// impl FlowField {
///     #[profile(2)] // log solves slower than 2ms
///     pub fn solve(&mut self, target: (usize, usize)) -> Result<()> { ... }
/// }
/// ```
///
/// Without an argument the threshold defaults to 1ms.
#[proc_macro_attribute]
pub fn profile(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    let threshold_ms: u128 = if attr.is_empty() {
        1
    } else {
        attr.to_string().trim().parse().unwrap_or(1)
    };

    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;
    let fn_name_str = sig.ident.to_string();

    let is_method = sig
        .inputs
        .iter()
        .any(|arg| matches!(arg, FnArg::Receiver(_)));

    let name_expr = if is_method {
        quote! {
            format!(
                "{}::{}",
                crate::crowd::profiling::short_type_name(std::any::type_name::<Self>()),
                #fn_name_str
            )
        }
    } else {
        quote! { String::from(#fn_name_str) }
    };

    let output = quote! {
        #(#attrs)*
        #vis #sig {
            #[cfg(feature = "perf_stats")]
            let _profile_timer = {
                struct ProfileGuard {
                    name: String,
                    start: std::time::Instant,
                }
                impl Drop for ProfileGuard {
                    fn drop(&mut self) {
                        let elapsed = self.start.elapsed();
                        if elapsed.as_millis() >= #threshold_ms {
                            bevy::log::info!("[PERF] {}: {:?}", self.name, elapsed);
                        }
                    }
                }
                ProfileGuard {
                    name: #name_expr,
                    start: std::time::Instant::now(),
                }
            };

            #block
        }
    };

    output.into()
}
