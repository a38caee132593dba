/// cos(π/6) = √3 / 2
pub const COS_PI_OVER_6: f64 = 0.866_025_403_784_438_6;

/// sin(π/6)
pub const SIN_PI_OVER_6: f64 = 0.5;

/// Default precision (decimal places) for approximate scalar equality
pub const SCALAR_EQ_PRECISION: i32 = 8;

/// Per-component tolerance for cartesian equality
pub const CARTESIAN_EQ_THRESHOLD: f64 = 1e-6;

/// Largest digit place magnitude a power scalar may carry. Covers every
/// finite f64 in binary, including subnormals.
pub const MAX_POWER: i32 = 1100;

/// Bits in one storage byte of a packed digit buffer
pub const BITS_PER_BYTE: u32 = 8;

/// Identifier of the variable namespace root
pub const VAR_NAMESPACE: &str = "var";

/// Reserved member of the namespace holding the latest result
pub const ANSWER_KEY: &str = "$ans";

/// Tag that precedes a plugin path in `exprcalc[path]`
pub const CALCULATOR_TAG: &str = "exprcalc";

/// Tag for cartesian vectors, both in expressions and in the wire format
pub const CARTESIAN_TAG: &str = "cc";

/// Tag for tetracoordinate vectors, both in expressions and in the wire format
pub const TETRACOORD_TAG: &str = "tc";

/// Tetracoordinate component holding its scalar value
pub const TETRA_VALUE_KEY: &str = "v";

/// Cartesian x component
pub const CARTESIAN_X_KEY: &str = "x";

/// Cartesian y component
pub const CARTESIAN_Y_KEY: &str = "y";

/// Named constant for cos(π/6) in expressions
pub const COS_PI_6_NAME: &str = "cospi6";

/// Named constant for sin(π/6) in expressions
pub const SIN_PI_6_NAME: &str = "sinpi6";
