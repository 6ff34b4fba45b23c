//! 核心宏定义
//!
//! 提供统一的宏来减少配置类型中的样板代码

/// 为结构体实现Default trait的宏
///
/// 使用示例:
/// ```rust
/// use skeleton_core::impl_default;
///
/// struct Limits {
///     max_depth: u32,
///     label: String,
/// }
///
/// impl_default!(Limits {
///     max_depth: 64,
///     label: String::new(),
/// });
///
/// assert_eq!(Limits::default().max_depth, 64);
/// ```
#[macro_export]
macro_rules! impl_default {
    ($struct_name:ident {
        $($field:ident: $value:expr),* $(,)?
    }) => {
        impl Default for $struct_name {
            fn default() -> Self {
                Self {
                    $($field: $value),*
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {

    struct TestStruct {
        depth: u32,
        label: String,
    }

    impl_default!(TestStruct {
        depth: 3,
        label: String::from("chain"),
    });

    #[test]
    fn test_impl_default() {
        let s = TestStruct::default();

        assert_eq!(s.depth, 3);
        assert_eq!(s.label, "chain");
    }
}
