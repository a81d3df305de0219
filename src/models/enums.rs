use serde::{Deserialize, Serialize};

use super::ModelError;

/// Macro to generate enum with as_str + label + std::str::FromStr pattern.
///
/// Variant order is the canonical order: `Ord` follows declaration order.
macro_rules! str_enum {
    ($name:ident { $($variant:ident => $s:literal, $label:literal),+ $(,)? }) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }

            /// Human-readable label used in rendered reports.
            pub fn label(&self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = ModelError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($s => Ok(Self::$variant)),+,
                    _ => Err(ModelError::InvalidEnum {
                        field: stringify!($name).into(),
                        value: s.into(),
                    }),
                }
            }
        }
    };
}

// Workflow order: a pickup moves left to right, cancellation last.
str_enum!(PickupStatus {
    Pending => "pending", "Pending",
    Scheduled => "scheduled", "Scheduled",
    InProgress => "in_progress", "In Progress",
    Packed => "packed", "Packed",
    PickedUp => "picked_up", "Picked Up",
    Completed => "completed", "Completed",
    Cancelled => "cancelled", "Cancelled",
});

str_enum!(Priority {
    Urgent => "urgent", "Urgent",
    High => "high", "High",
    Medium => "medium", "Medium",
    Low => "low", "Low",
});
