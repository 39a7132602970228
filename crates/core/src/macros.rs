//! Macro for declaring rules with minimal boilerplate.
//!
//! - [`compliance_rule!`]: struct + [`ComplianceRule`](crate::ComplianceRule)
//!   impl + optional factory fn returning a [`SharedRule`](crate::SharedRule)
//!
//! # Examples
//!
//! ```
//! use compliance_core::compliance_rule;
//!
//! // Unit rule (no fields)
//! compliance_rule! {
//!     pub AcceptsTerms;
//!     key = "terms";
//!     message = "Terms must be accepted";
//!     validate(self, scope) {
//!         if !scope.require_bool("terms")? {
//!             scope.invalidate(None, None);
//!         }
//!         Ok(())
//!     }
//!     fn accepts_terms();
//! }
//!
//! // Struct with fields
//! compliance_rule! {
//!     pub MinAge { min: i64 };
//!     key = "age";
//!     validate(self, scope) {
//!         if scope.require_i64("age")? < self.min {
//!             let message = format!("Must be at least {}", self.min);
//!             scope.invalidate(None, Some(message.as_str()));
//!         }
//!         Ok(())
//!     }
//!     fn min_age(min: i64);
//! }
//! ```

/// Declares a rule: struct definition, `ComplianceRule` implementation and,
/// optionally, a factory function returning a `SharedRule`.
///
/// `key = ...;` and `message = ...;` are optional and must be `&'static str`
/// expressions; omitted ones keep the trait defaults.
///
/// # Variants
///
/// **Unit rule** (zero-sized, derives `Copy` and `Default`):
/// ```rust,ignore
/// compliance_rule! {
///     pub NotBanned;
///     key = "user";
///     validate(self, scope) { ... }
///     fn not_banned();
/// }
/// ```
///
/// **Struct with fields** (auto `new` from all fields, fields are `pub`):
/// ```rust,ignore
/// compliance_rule! {
///     pub MaxItems { max: usize };
///     key = "items";
///     message = "Too many items";
///     validate(self, scope) { ... }
///     fn max_items(max: usize);
/// }
/// ```
#[macro_export]
macro_rules! compliance_rule {
    // ── Shared trait impl ───────────────────────────────────────────────
    (@impl $name:ident; $($key:expr)?; $($msg:expr)?; $self_:ident, $scope:ident, $body:block) => {
        impl $crate::ComplianceRule for $name {
            $(
                fn key(&self) -> &str {
                    $key
                }
            )?

            $(
                fn message(&self) -> &str {
                    $msg
                }
            )?

            fn name(&self) -> &str {
                stringify!($name)
            }

            fn validate(
                &$self_,
                $scope: &mut $crate::RuleScope<'_>,
            ) -> $crate::RuleResult $body
        }
    };

    // ── Unit rule ───────────────────────────────────────────────────────
    (
        $(#[$meta:meta])*
        $vis:vis $name:ident;
        $(key = $key:expr;)?
        $(message = $msg:expr;)?
        validate($self_:ident, $scope:ident) $body:block
        $(fn $factory:ident();)?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        $vis struct $name;

        $crate::compliance_rule!(@impl $name; $($key)?; $($msg)?; $self_, $scope, $body);

        $(
            #[must_use]
            $vis fn $factory() -> $crate::SharedRule {
                ::std::sync::Arc::new($name)
            }
        )?
    };

    // ── Struct with fields ──────────────────────────────────────────────
    (
        $(#[$meta:meta])*
        $vis:vis $name:ident { $($field:ident: $fty:ty),+ $(,)? };
        $(key = $key:expr;)?
        $(message = $msg:expr;)?
        validate($self_:ident, $scope:ident) $body:block
        $(fn $factory:ident($($farg:ident: $faty:ty),* $(,)?);)?
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        $vis struct $name {
            $(pub $field: $fty,)+
        }

        impl $name {
            #[must_use]
            pub fn new($($field: $fty),+) -> Self {
                Self { $($field),+ }
            }
        }

        $crate::compliance_rule!(@impl $name; $($key)?; $($msg)?; $self_, $scope, $body);

        $(
            #[must_use]
            $vis fn $factory($($farg: $faty),*) -> $crate::SharedRule {
                ::std::sync::Arc::new($name::new($($farg),*))
            }
        )?
    };
}
