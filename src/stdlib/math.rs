//! The `math` library: numeric functions and constants.
//!
//! `random`/`randomseed` share one seeded generator per library instance,
//! so `reset_environment` also resets the stream.

use super::{int_arg, number_arg};
use crate::error::RuntimeError;
use crate::library::Library;
use crate::value::Value;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::cell::RefCell;
use std::rc::Rc;

/// Wrap a one-argument float function as a library method.
fn float_fn(
    name: &'static str,
    func: fn(f64) -> f64,
) -> impl Fn(&[Value]) -> Result<Value, RuntimeError> {
    move |args| Ok(Value::Float(func(number_arg(name, args, 0)?)))
}

pub fn library() -> Library {
    let rng = Rc::new(RefCell::new(StdRng::from_entropy()));
    let random_rng = rng.clone();
    let seed_rng = rng;

    Library::new("math")
        .attr("pi", Value::Float(std::f64::consts::PI))
        .attr("huge", Value::Float(f64::INFINITY))
        .attr("maxinteger", Value::Integer(i64::MAX))
        .attr("mininteger", Value::Integer(i64::MIN))
        .attr("e", Value::Float(std::f64::consts::E))
        .attr("sqrt2", Value::Float(std::f64::consts::SQRT_2))
        .method("abs", |args| match args.first() {
            Some(Value::Integer(n)) => Ok(Value::Integer(n.wrapping_abs())),
            _ => Ok(Value::Float(number_arg("abs", args, 0)?.abs())),
        })
        .method("acos", float_fn("acos", f64::acos))
        .method("asin", float_fn("asin", f64::asin))
        .method("atan", float_fn("atan", f64::atan))
        .method("atan2", |args| {
            let y = number_arg("atan2", args, 0)?;
            let x = number_arg("atan2", args, 1)?;
            Ok(Value::Float(y.atan2(x)))
        })
        .method("ceil", |args| {
            Ok(Value::Integer(number_arg("ceil", args, 0)?.ceil() as i64))
        })
        .method("cos", float_fn("cos", f64::cos))
        .method("cosh", float_fn("cosh", f64::cosh))
        .method("deg", float_fn("deg", f64::to_degrees))
        .method("exp", float_fn("exp", f64::exp))
        .method("floor", |args| {
            Ok(Value::Integer(number_arg("floor", args, 0)?.floor() as i64))
        })
        .method("fmod", |args| {
            let a = number_arg("fmod", args, 0)?;
            let b = number_arg("fmod", args, 1)?;
            Ok(Value::Float(a % b))
        })
        .method("frexp", |args| {
            let x = number_arg("frexp", args, 0)?;
            let (mantissa, exponent) = frexp(x);
            Ok(Value::values(vec![
                Value::Float(mantissa),
                Value::Integer(exponent),
            ]))
        })
        .method("ldexp", |args| {
            let mantissa = number_arg("ldexp", args, 0)?;
            let exponent = int_arg("ldexp", args, 1)?;
            Ok(Value::Float(mantissa * (exponent as f64).exp2()))
        })
        .method("log", |args| {
            let x = number_arg("log", args, 0)?;
            Ok(match args.get(1) {
                Some(_) => Value::Float(x.log(number_arg("log", args, 1)?)),
                None => Value::Float(x.ln()),
            })
        })
        .method("log10", float_fn("log10", f64::log10))
        .method("max", |args| fold_extremum("max", args, true))
        .method("min", |args| fold_extremum("min", args, false))
        .method("modf", |args| {
            let x = number_arg("modf", args, 0)?;
            Ok(Value::values(vec![
                Value::Float(x.trunc()),
                Value::Float(x.fract()),
            ]))
        })
        .method("pow", |args| {
            let x = number_arg("pow", args, 0)?;
            let y = number_arg("pow", args, 1)?;
            Ok(Value::Float(x.powf(y)))
        })
        .method("rad", float_fn("rad", f64::to_radians))
        .method("random", move |args| {
            let mut rng = random_rng.borrow_mut();
            match args.len() {
                0 => Ok(Value::Float(rng.gen_range(0.0..1.0))),
                1 => {
                    let upper = int_arg("random", args, 0)?;
                    if upper < 1 {
                        return Err(RuntimeError::invalid_op("random: empty interval"));
                    }
                    Ok(Value::Integer(rng.gen_range(1..=upper)))
                }
                _ => {
                    let lower = int_arg("random", args, 0)?;
                    let upper = int_arg("random", args, 1)?;
                    if lower > upper {
                        return Err(RuntimeError::invalid_op("random: empty interval"));
                    }
                    Ok(Value::Integer(rng.gen_range(lower..=upper)))
                }
            }
        })
        .method("randomseed", move |args| {
            let seed = number_arg("randomseed", args, 0)?;
            *seed_rng.borrow_mut() = StdRng::seed_from_u64(seed.to_bits());
            Ok(Value::Nil)
        })
        .method("sin", float_fn("sin", f64::sin))
        .method("sinh", float_fn("sinh", f64::sinh))
        .method("sqrt", float_fn("sqrt", f64::sqrt))
        .method("tan", float_fn("tan", f64::tan))
        .method("tanh", float_fn("tanh", f64::tanh))
}

/// Variadic max/min keeping integer results integral.
fn fold_extremum(name: &str, args: &[Value], want_max: bool) -> Result<Value, RuntimeError> {
    if args.is_empty() {
        return Err(RuntimeError::arity(name, 1, 0));
    }
    let mut best = args[0].clone();
    let mut best_n = number_arg(name, args, 0)?;
    for position in 1..args.len() {
        let n = number_arg(name, args, position)?;
        if (want_max && n > best_n) || (!want_max && n < best_n) {
            best_n = n;
            best = args[position].clone();
        }
    }
    Ok(best)
}

/// Split into mantissa in [0.5, 1) and power-of-two exponent.
fn frexp(x: f64) -> (f64, i64) {
    if x == 0.0 || !x.is_finite() {
        return (x, 0);
    }
    let exponent = x.abs().log2().floor() as i64 + 1;
    (x / (exponent as f64).exp2(), exponent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::NativeKind;

    fn call(name: &str, args: &[Value]) -> Result<Value, RuntimeError> {
        let lib = library();
        let method = lib.get_method(name).expect("method not found");
        match &method.kind {
            NativeKind::Plain(func) => (func.as_ref())(args),
            _ => panic!("expected plain method"),
        }
    }

    #[test]
    fn test_floor_ceil_return_integers() {
        assert_eq!(call("floor", &[Value::Float(2.7)]).unwrap(), Value::Integer(2));
        assert_eq!(call("ceil", &[Value::Float(2.1)]).unwrap(), Value::Integer(3));
        assert_eq!(
            call("floor", &[Value::Float(-2.5)]).unwrap(),
            Value::Integer(-3)
        );
    }

    #[test]
    fn test_abs_preserves_kind() {
        assert_eq!(call("abs", &[Value::Integer(-4)]).unwrap(), Value::Integer(4));
        assert_eq!(call("abs", &[Value::Float(-4.5)]).unwrap(), Value::Float(4.5));
    }

    #[test]
    fn test_max_min_variadic() {
        let args = [Value::Integer(3), Value::Integer(9), Value::Integer(5)];
        assert_eq!(call("max", &args).unwrap(), Value::Integer(9));
        assert_eq!(call("min", &args).unwrap(), Value::Integer(3));
    }

    #[test]
    fn test_sqrt() {
        assert_eq!(call("sqrt", &[Value::Integer(9)]).unwrap(), Value::Float(3.0));
    }

    #[test]
    fn test_frexp_roundtrip() {
        let (m, e) = frexp(8.0);
        assert_eq!(m, 0.5);
        assert_eq!(e, 4);
        assert_eq!(m * (e as f64).exp2(), 8.0);
    }

    #[test]
    fn test_modf_splits() {
        let result = call("modf", &[Value::Float(3.25)]).unwrap();
        let Value::Values(parts) = result else {
            panic!("expected values");
        };
        assert_eq!(parts[0], Value::Float(3.0));
        assert_eq!(parts[1], Value::Float(0.25));
    }

    #[test]
    fn test_random_range() {
        for _ in 0..50 {
            let value = call("random", &[Value::Integer(1), Value::Integer(6)]).unwrap();
            let Value::Integer(n) = value else {
                panic!("expected integer");
            };
            assert!((1..=6).contains(&n));
        }
    }

    #[test]
    fn test_random_rejects_empty_interval() {
        assert!(call("random", &[Value::Integer(0)]).is_err());
    }
}
