// Copyright 2025 Sparse RNN Contributors
// SPDX-License-Identifier: Apache-2.0

/*
 * Copyright 2025 Sparse RNN Contributors
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 */

//! # Activation Functions
//!
//! Scalar host semantics of the activations a neuron can apply to its
//! weighted sum.
//!
//! ## Ameo family
//!
//! ```text
//! ameo(x):
//!     x <= -1      -> max(x + 2, 0)
//!     -1 < x <= 0  -> -x
//!     x > 0        -> min(x, 1)
//!
//! softLeakyAmeo(x, l):
//!     x <= -2      -> l(x + 2)
//!     x <= -1.5    -> 8(x + 2)^4
//!     x <= -0.5    -> -8x^4 - 32x^3 - 48x^2 - 32x - 7
//!     x <= 0.5     -> 8x^4
//!     x <= 1       -> -8x^4 + 32x^3 - 48x^2 + 32x - 7
//!     x > 1        -> l(x - 1) + 1
//!
//! interpolatedAmeo(x, factor, l):
//!     x' = x * 0.5 - 0.5
//!     factor * (ameo(x') - 0.5) * 2 + (1 - factor) * (softLeakyAmeo(x', l) - 0.5) * 2
//! ```
//!
//! Neurons evaluate every Ameo variant through `interpolated_ameo`, which
//! owns the affine remap.

use serde::{Deserialize, Serialize};

use crate::types::{GraphError, Result};

/// Piecewise linear Ameo, evaluated on an already remapped input
#[inline]
pub fn ameo(x: f32) -> f32 {
    if x <= -1.0 {
        (x + 2.0).max(0.0)
    } else if x <= 0.0 {
        -x
    } else {
        x.min(1.0)
    }
}

/// Degree-4 smoothed Ameo with affine leaky tails, evaluated on an already
/// remapped input
#[inline]
pub fn soft_leaky_ameo(x: f32, leakyness: f32) -> f32 {
    if x <= -2.0 {
        leakyness * (x + 2.0)
    } else if x <= -1.5 {
        let x_plus_2 = x + 2.0;
        8.0 * (x_plus_2 * x_plus_2 * x_plus_2 * x_plus_2)
    } else if x <= -0.5 {
        -8.0 * (x * x * x * x) - 32.0 * (x * x * x) - 48.0 * (x * x) - 32.0 * x - 7.0
    } else if x <= 0.5 {
        8.0 * (x * x * x * x)
    } else if x <= 1.0 {
        -8.0 * (x * x * x * x) + 32.0 * (x * x * x) - 48.0 * (x * x) + 32.0 * x - 7.0
    } else {
        leakyness * (x - 1.0) + 1.0
    }
}

/// Convex mix of `ameo` and `soft_leaky_ameo` on a raw pre-activation
#[inline]
pub fn interpolated_ameo(x: f32, factor: f32, leakyness: f32) -> f32 {
    let x = x * 0.5 - 0.5;

    let ameo_y = (ameo(x) - 0.5) * 2.0;
    let soft_leaky_ameo_y = (soft_leaky_ameo(x, leakyness) - 0.5) * 2.0;

    factor * ameo_y + (1.0 - factor) * soft_leaky_ameo_y
}

/// Growing cosine unit
#[inline]
pub fn gcu(x: f32) -> f32 {
    x * x.cos()
}

/// Closed set of activations a neuron may carry.
///
/// The serde form is the tagged union used by the weight and graph files:
/// `"linear"`, `"tanh"`, or `{"type": "leakyAmeo", "leakyness": 0.1}` style
/// objects.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "ActivationRepr", into = "ActivationRepr")]
pub enum Activation {
    #[default]
    Linear,
    Tanh,
    Ameo,
    LeakyAmeo {
        leakyness: f32,
    },
    SoftLeakyAmeo {
        leakyness: f32,
    },
    InterpolatedAmeo {
        factor: f32,
        leakyness: f32,
    },
    Gcu,
}

impl Activation {
    /// Build an interpolated Ameo, rejecting a factor outside `[0, 1]`
    pub fn interpolated_ameo(factor: f32, leakyness: f32) -> Result<Self> {
        let activation = Activation::InterpolatedAmeo { factor, leakyness };
        activation.validate()?;
        Ok(activation)
    }

    pub fn validate(&self) -> Result<()> {
        if let Activation::InterpolatedAmeo { factor, .. } = *self {
            if !(0.0..=1.0).contains(&factor) {
                return Err(GraphError::InvalidActivation(format!(
                    "interpolatedAmeo factor must be in [0, 1]; got {}",
                    factor
                )));
            }
        }
        Ok(())
    }

    #[inline]
    pub fn apply(&self, x: f32) -> f32 {
        match *self {
            Activation::Linear => x,
            Activation::Tanh => x.tanh(),
            Activation::Ameo => interpolated_ameo(x, 1.0, 0.0),
            Activation::LeakyAmeo { leakyness } => interpolated_ameo(x, 1.0, leakyness),
            Activation::SoftLeakyAmeo { leakyness } => interpolated_ameo(x, 0.0, leakyness),
            Activation::InterpolatedAmeo { factor, leakyness } => {
                interpolated_ameo(x, factor, leakyness)
            }
            Activation::Gcu => gcu(x),
        }
    }
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ActivationRepr {
    Named(String),
    Tagged(TaggedActivation),
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
enum TaggedActivation {
    Linear,
    Tanh,
    Ameo,
    LeakyAmeo {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        leakyness: Option<f32>,
    },
    SoftLeakyAmeo {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        leakyness: Option<f32>,
    },
    InterpolatedAmeo {
        factor: f32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        leakyness: Option<f32>,
    },
    Gcu,
}

impl TryFrom<ActivationRepr> for Activation {
    type Error = String;

    fn try_from(repr: ActivationRepr) -> core::result::Result<Self, Self::Error> {
        let activation = match repr {
            ActivationRepr::Named(name) => match name.as_str() {
                "linear" => Activation::Linear,
                "tanh" => Activation::Tanh,
                "ameo" => Activation::Ameo,
                "gcu" => Activation::Gcu,
                other => return Err(format!("unknown activation '{}'", other)),
            },
            ActivationRepr::Tagged(tagged) => match tagged {
                TaggedActivation::Linear => Activation::Linear,
                TaggedActivation::Tanh => Activation::Tanh,
                TaggedActivation::Ameo => Activation::Ameo,
                TaggedActivation::LeakyAmeo { leakyness } => Activation::LeakyAmeo {
                    leakyness: leakyness.unwrap_or(0.0),
                },
                TaggedActivation::SoftLeakyAmeo { leakyness } => Activation::SoftLeakyAmeo {
                    leakyness: leakyness.unwrap_or(0.0),
                },
                TaggedActivation::InterpolatedAmeo { factor, leakyness } => {
                    Activation::InterpolatedAmeo {
                        factor,
                        leakyness: leakyness.unwrap_or(0.0),
                    }
                }
                TaggedActivation::Gcu => Activation::Gcu,
            },
        };
        activation.validate().map_err(|e| e.to_string())?;
        Ok(activation)
    }
}

impl From<Activation> for ActivationRepr {
    fn from(activation: Activation) -> Self {
        match activation {
            Activation::Linear => ActivationRepr::Named("linear".to_string()),
            Activation::Tanh => ActivationRepr::Named("tanh".to_string()),
            Activation::Ameo => ActivationRepr::Tagged(TaggedActivation::Ameo),
            Activation::LeakyAmeo { leakyness } => {
                ActivationRepr::Tagged(TaggedActivation::LeakyAmeo {
                    leakyness: Some(leakyness),
                })
            }
            Activation::SoftLeakyAmeo { leakyness } => {
                ActivationRepr::Tagged(TaggedActivation::SoftLeakyAmeo {
                    leakyness: Some(leakyness),
                })
            }
            Activation::InterpolatedAmeo { factor, leakyness } => {
                ActivationRepr::Tagged(TaggedActivation::InterpolatedAmeo {
                    factor,
                    leakyness: Some(leakyness),
                })
            }
            Activation::Gcu => ActivationRepr::Tagged(TaggedActivation::Gcu),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_POINTS: [f32; 10] = [-3.0, -2.0, -1.5, -1.0, -0.5, 0.0, 0.5, 1.0, 1.5, 3.0];

    #[test]
    fn test_ameo_regions() {
        assert_eq!(ameo(-3.0), 0.0);
        assert_eq!(ameo(-1.5), 0.5);
        assert_eq!(ameo(-1.0), 1.0);
        assert_eq!(ameo(-0.25), 0.25);
        assert_eq!(ameo(0.0), 0.0);
        assert_eq!(ameo(0.5), 0.5);
        assert_eq!(ameo(4.0), 1.0);
    }

    #[test]
    fn test_soft_leaky_ameo_is_continuous_at_breakpoints() {
        for breakpoint in [-2.0f32, -1.5, -0.5, 0.5, 1.0] {
            let left = soft_leaky_ameo(breakpoint - 1e-4, 0.1);
            let right = soft_leaky_ameo(breakpoint + 1e-4, 0.1);
            assert!(
                (left - right).abs() < 1e-2,
                "discontinuity at {}: {} vs {}",
                breakpoint,
                left,
                right
            );
        }
        assert_eq!(soft_leaky_ameo(-1.5, 0.0), 0.5);
        assert_eq!(soft_leaky_ameo(1.0, 0.0), 1.0);
    }

    #[test]
    fn test_soft_leaky_ameo_tails() {
        assert!((soft_leaky_ameo(-4.0, 0.1) - (-0.2)).abs() < 1e-6);
        assert!((soft_leaky_ameo(3.0, 0.1) - 1.2).abs() < 1e-6);
    }

    #[test]
    fn test_interpolated_factor_zero_matches_soft_leaky() {
        for leakyness in [0.0f32, 0.01, 0.3] {
            let soft = Activation::SoftLeakyAmeo { leakyness };
            let interpolated = Activation::interpolated_ameo(0.0, leakyness).unwrap();
            for x in SAMPLE_POINTS {
                assert_eq!(interpolated.apply(x), soft.apply(x), "x={}", x);
                let remapped = (soft_leaky_ameo(x * 0.5 - 0.5, leakyness) - 0.5) * 2.0;
                assert!((interpolated.apply(x) - remapped).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_interpolated_factor_one_matches_ameo() {
        let interpolated = Activation::interpolated_ameo(1.0, 0.5).unwrap();
        for x in SAMPLE_POINTS {
            let expected = (ameo(x * 0.5 - 0.5) - 0.5) * 2.0;
            assert!((interpolated.apply(x) - expected).abs() < 1e-6, "x={}", x);
            assert_eq!(Activation::Ameo.apply(x), expected);
        }
    }

    #[test]
    fn test_all_activations_map_zero_to_zero() {
        let activations = [
            Activation::Linear,
            Activation::Tanh,
            Activation::Ameo,
            Activation::LeakyAmeo { leakyness: 0.1 },
            Activation::SoftLeakyAmeo { leakyness: 0.1 },
            Activation::InterpolatedAmeo {
                factor: 0.3,
                leakyness: 0.1,
            },
            Activation::Gcu,
        ];
        for activation in activations {
            assert!(activation.apply(0.0).abs() < 1e-6, "{:?}", activation);
        }
    }

    #[test]
    fn test_invalid_factor_rejected() {
        assert!(Activation::interpolated_ameo(1.5, 0.0).is_err());
        assert!(Activation::interpolated_ameo(-0.1, 0.0).is_err());
        assert!(Activation::interpolated_ameo(0.0, 0.0).is_ok());
    }

    #[test]
    fn test_serde_forms() {
        let parsed: Activation = serde_json::from_str("\"tanh\"").unwrap();
        assert_eq!(parsed, Activation::Tanh);

        let parsed: Activation = serde_json::from_str("\"ameo\"").unwrap();
        assert_eq!(parsed, Activation::Ameo);

        let parsed: Activation =
            serde_json::from_str(r#"{"type":"leakyAmeo","leakyness":0.1}"#).unwrap();
        assert_eq!(parsed, Activation::LeakyAmeo { leakyness: 0.1 });

        let parsed: Activation = serde_json::from_str(r#"{"type":"softLeakyAmeo"}"#).unwrap();
        assert_eq!(parsed, Activation::SoftLeakyAmeo { leakyness: 0.0 });

        let parsed: Activation = serde_json::from_str(r#"{"type":"gcu"}"#).unwrap();
        assert_eq!(parsed, Activation::Gcu);

        assert_eq!(
            serde_json::to_string(&Activation::Linear).unwrap(),
            "\"linear\""
        );
        let json = serde_json::to_string(&Activation::InterpolatedAmeo {
            factor: 0.5,
            leakyness: 0.25,
        })
        .unwrap();
        assert!(json.contains("\"type\":\"interpolatedAmeo\""));
    }

    #[test]
    fn test_serde_rejects_bad_factor_and_unknown_names() {
        assert!(
            serde_json::from_str::<Activation>(r#"{"type":"interpolatedAmeo","factor":2.0}"#)
                .is_err()
        );
        assert!(serde_json::from_str::<Activation>("\"relu\"").is_err());
    }
}
