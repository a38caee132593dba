//! JSON serde for persisted values and variable namespaces.
//!
//! Numbers and booleans pass through as JSON primitives. Everything else is
//! an object discriminated by its `type` field. Packed digit buffers are
//! stored as plain arrays of byte values, and a missing value is `null`.
//! Infinite and NaN numbers, which JSON cannot hold, are the strings
//! `"Infinity"`, `"-Infinity"` and `"NaN"`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::calculator::CalculatorCache;
use crate::cartesian::CartesianCoordinate;
use crate::constants::{ANSWER_KEY, MAX_POWER, VAR_NAMESPACE};
use crate::context::VariableContext;
use crate::error::{CalcError, Result, ScalarError};
use crate::radix::{DigitOrder, Radix};
use crate::scalar::{Digits, PowerScalar, Sign};
use crate::tetracoord::Tetracoordinate;
use crate::value::Value;

// --- Wire format types ---

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum WireValue {
    Bool(bool),
    Number(f64),
    NonFinite(WireNonFinite),
    Object(WireObject),
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireNonFinite {
    #[serde(rename = "Infinity")]
    Infinity,
    #[serde(rename = "-Infinity")]
    NegInfinity,
    #[serde(rename = "NaN")]
    NaN,
}

impl WireNonFinite {
    fn from_number(n: f64) -> Self {
        match n {
            n if n.is_nan() => WireNonFinite::NaN,
            n if n > 0.0 => WireNonFinite::Infinity,
            _ => WireNonFinite::NegInfinity,
        }
    }

    fn value(self) -> f64 {
        match self {
            WireNonFinite::Infinity => f64::INFINITY,
            WireNonFinite::NegInfinity => f64::NEG_INFINITY,
            WireNonFinite::NaN => f64::NAN,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum WireObject {
    #[serde(rename = "powerscalar")]
    PowerScalar(WirePowerScalar),
    #[serde(rename = "tc")]
    Tetra(WireTetra),
    #[serde(rename = "cc")]
    Cartesian(WireCartesian),
    #[serde(rename = "exprcalc")]
    Calculator(WireCalculator),
    #[serde(rename = "collection")]
    Collection(WireCollection),
}

impl WireObject {
    fn type_tag(&self) -> &'static str {
        match self {
            WireObject::PowerScalar(_) => "powerscalar",
            WireObject::Tetra(_) => "tc",
            WireObject::Cartesian(_) => "cc",
            WireObject::Calculator(_) => "exprcalc",
            WireObject::Collection(_) => "collection",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum WireDigits {
    Integer(u64),
    Bytes(Vec<u8>),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WirePowerScalar {
    pub digits: WireDigits,
    pub radix: char,
    pub power: i32,
    pub sign: i8,
    #[serde(default)]
    pub irrational: bool,
    #[serde(rename = "levelOrder", alias = "digitOrder", default = "default_order_tag")]
    pub level_order: char,
}

fn default_order_tag() -> char {
    DigitOrder::default().tag()
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WireTetra {
    pub value: Box<WireObject>,
    #[serde(rename = "num_levels", alias = "numLevels")]
    pub num_levels: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WireCartesian {
    pub x: Box<WireObject>,
    pub y: Box<WireObject>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WireCalculator {
    #[serde(rename = "filePath")]
    pub file_path: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WireCollection {
    pub items: Vec<WireValue>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WireContext {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "$ans", default)]
    pub answer: Option<WireValue>,
    #[serde(default)]
    pub values: BTreeMap<String, Option<WireValue>>,
}

// --- Conversion: Domain → Wire ---

pub fn serialize(value: &Value) -> WireValue {
    match value {
        Value::Number(n) if n.is_finite() => WireValue::Number(*n),
        Value::Number(n) => WireValue::NonFinite(WireNonFinite::from_number(*n)),
        Value::Bool(b) => WireValue::Bool(*b),
        Value::Scalar(s) => WireValue::Object(scalar_to_wire(s)),
        Value::Tetra(t) => WireValue::Object(WireObject::Tetra(WireTetra {
            value: Box::new(scalar_to_wire(t.value())),
            num_levels: t.num_levels(),
        })),
        Value::Cartesian(c) => WireValue::Object(WireObject::Cartesian(WireCartesian {
            x: Box::new(scalar_to_wire(c.x())),
            y: Box::new(scalar_to_wire(c.y())),
        })),
        Value::Calculator(c) => WireValue::Object(WireObject::Calculator(WireCalculator {
            file_path: c.path().to_string(),
        })),
        Value::Collection(items) => WireValue::Object(WireObject::Collection(WireCollection {
            items: items.iter().map(serialize).collect(),
        })),
    }
}

fn scalar_to_wire(s: &PowerScalar) -> WireObject {
    let digits = match s.digits() {
        Digits::Integer(n) => WireDigits::Integer(*n),
        Digits::Bytes(bytes) => WireDigits::Bytes(bytes.clone()),
    };
    WireObject::PowerScalar(WirePowerScalar {
        digits,
        radix: s.radix().tag(),
        power: s.power(),
        sign: s.sign().value(),
        irrational: s.is_irrational(),
        level_order: s.order().tag(),
    })
}

// --- Conversion: Wire → Domain ---

/// Rebuild a value. Calculator references are loaded through `cache`.
pub fn deserialize(wire: WireValue, cache: &CalculatorCache) -> Result<Value> {
    let obj = match wire {
        WireValue::Number(n) => return Ok(Value::Number(n)),
        WireValue::NonFinite(n) => return Ok(Value::Number(n.value())),
        WireValue::Bool(b) => return Ok(Value::Bool(b)),
        WireValue::Object(obj) => obj,
    };

    Ok(match obj {
        WireObject::PowerScalar(ps) => Value::Scalar(wire_to_scalar(ps, "powerscalar")?),
        WireObject::Tetra(tc) => {
            let value = expect_scalar(*tc.value, "tc.value")?;
            let tetra = Tetracoordinate::from_parts(value, tc.num_levels)
                .map_err(|e| CalcError::scalar("tc.value", e))?;
            Value::Tetra(tetra)
        }
        WireObject::Cartesian(cc) => {
            let x = expect_scalar(*cc.x, "cc.x")?;
            let y = expect_scalar(*cc.y, "cc.y")?;
            Value::Cartesian(CartesianCoordinate::new(x, y))
        }
        WireObject::Calculator(calc) => Value::Calculator(cache.load(&calc.file_path)?),
        WireObject::Collection(coll) => Value::Collection(
            coll.items
                .into_iter()
                .map(|item| deserialize(item, cache))
                .collect::<Result<Vec<_>>>()?,
        ),
    })
}

fn expect_scalar(obj: WireObject, field: &str) -> Result<PowerScalar> {
    match obj {
        WireObject::PowerScalar(ps) => wire_to_scalar(ps, field),
        other => Err(CalcError::Type(format!(
            "{field} must be a powerscalar, found {}",
            other.type_tag()
        ))),
    }
}

fn wire_to_scalar(ps: WirePowerScalar, field: &str) -> Result<PowerScalar> {
    let malformed = |raw: String| CalcError::scalar(field, ScalarError::Malformed { raw });

    if ps.power.checked_abs().is_none_or(|p| p > MAX_POWER) {
        return Err(CalcError::load(
            &format!("{field}.power"),
            format!("{} is outside ±{MAX_POWER}", ps.power),
        ));
    }

    let radix =
        Radix::from_tag(ps.radix).ok_or_else(|| malformed(format!("radix {:?}", ps.radix)))?;
    let sign = Sign::from_value(ps.sign).ok_or_else(|| malformed(format!("sign {}", ps.sign)))?;
    let order = DigitOrder::from_tag(ps.level_order)
        .ok_or_else(|| malformed(format!("level order {:?}", ps.level_order)))?;
    let digits = match ps.digits {
        WireDigits::Integer(n) => Digits::Integer(n),
        WireDigits::Bytes(bytes) => Digits::Bytes(bytes),
    };

    PowerScalar::from_parts(digits, radix, ps.power, sign, ps.irrational, order)
        .map_err(|e| CalcError::scalar(field, e))
}

impl WireContext {
    pub fn from_context(ctx: &VariableContext) -> Self {
        WireContext {
            kind: VAR_NAMESPACE.to_string(),
            answer: ctx.answer().map(serialize),
            values: ctx
                .entries()
                .map(|(key, value)| (key.to_string(), value.map(serialize)))
                .collect(),
        }
    }

    /// Deserialize every entry over `ctx`. Fails without touching `ctx`
    /// if any entry is invalid.
    pub(crate) fn merge_into(self, ctx: &mut VariableContext, cache: &CalculatorCache) -> Result<()> {
        if self.kind != VAR_NAMESPACE {
            return Err(CalcError::load(
                VAR_NAMESPACE,
                format!("unexpected type tag {:?}", self.kind),
            ));
        }

        let answer = self.answer.map(|a| deserialize(a, cache)).transpose()?;
        let mut entries = Vec::with_capacity(self.values.len());
        for (key, wire) in self.values {
            if key == ANSWER_KEY {
                continue;
            }
            let value = wire.map(|w| deserialize(w, cache)).transpose()?;
            entries.push((key, value));
        }

        if answer.is_some() {
            ctx.restore_answer(answer);
        }
        for (key, value) in entries {
            ctx.restore_entry(key, value);
        }
        Ok(())
    }
}

/// Parse a serialized namespace into a fresh context.
pub fn import_json(json: &str, cache: &CalculatorCache) -> Result<VariableContext> {
    let wire: WireContext = serde_json::from_str(json)?;
    let mut ctx = VariableContext::new();
    ctx.load(wire, cache)?;
    Ok(ctx)
}

/// Serialize a context to pretty JSON.
pub fn export_json(ctx: &VariableContext) -> std::result::Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&ctx.save())
}
