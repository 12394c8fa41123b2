pub use enclose::*;

/// Builds a [`ComputedFn`](crate::ComputedFn).
///
/// ```ignore
/// let full_name = computed!(cx => format!("{} {}", cx.get("first"), cx.get("last")).into());
/// let greeting = computed!((prefix) cx => format!("{prefix} {}", cx.get("name")).into());
/// ```
#[macro_export]
macro_rules! computed {
    (( $($d_tt:tt)* ) $cx:ident => $($b:tt)*) => {
        std::rc::Rc::new($crate::macros::enclose!(($( $d_tt )*) move |$cx: &$crate::Scope<'_>| -> $crate::Value { $($b)* })) as $crate::ComputedFn
    };
    ($cx:ident => $($b:tt)*) => {
        std::rc::Rc::new(move |$cx: &$crate::Scope<'_>| -> $crate::Value { $($b)* }) as $crate::ComputedFn
    };
}

/// Builds a [`Method`](crate::Method).
///
/// ```ignore
/// let reset = method!((counter) cx, _event => { cx.set("count", 0); });
/// ```
#[macro_export]
macro_rules! method {
    (( $($d_tt:tt)* ) $cx:ident, $event:ident => $($b:tt)*) => {
        std::rc::Rc::new($crate::macros::enclose!(($( $d_tt )*) move |$cx: &$crate::Context, $event: &$crate::Event| { $($b)* })) as $crate::Method
    };
    ($cx:ident, $event:ident => $($b:tt)*) => {
        std::rc::Rc::new(move |$cx: &$crate::Context, $event: &$crate::Event| { $($b)* }) as $crate::Method
    };
}
