// Prime field arithmetic (C1).
//
// `Field` is a residue modulo the modulus carried in `FieldParams`. Division
// is multiplication by the modular inverse, computed via Fermat's little
// theorem since the modulus is prime.

use std::fmt;

use lazy_static::lazy_static;
use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::error::WitnessError;

lazy_static! {
    /// Parsed once; `FieldParams::bn254()` is called on every `Env::new`.
    static ref BN254_MODULUS: BigUint =
        "21888242871839275222246405745257275088548364400416034343698204186575808495617"
            .parse()
            .expect("hardcoded BN254 modulus is valid");
}

/// Runtime configuration for which prime field this compilation targets.
///
/// `spec.md` treats the modulus `p` as an ambient constant; this crate makes
/// it an explicit, threaded parameter so tests can use small, readable
/// primes instead of a 254-bit one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldParams {
    modulus: BigUint,
}

impl FieldParams {
    /// The BN254 scalar field modulus, the default target for this compiler.
    pub fn bn254() -> FieldParams {
        FieldParams { modulus: BN254_MODULUS.clone() }
    }

    pub fn with_modulus(modulus: BigUint) -> FieldParams {
        FieldParams { modulus }
    }

    pub fn modulus(&self) -> &BigUint {
        &self.modulus
    }
}

impl Default for FieldParams {
    fn default() -> Self {
        FieldParams::bn254()
    }
}

/// An element of `F_p`, always kept reduced in `[0, p)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Field {
    value: BigUint,
    modulus: BigUint,
}

impl Field {
    pub fn zero(params: &FieldParams) -> Field {
        Field { value: BigUint::zero(), modulus: params.modulus().clone() }
    }

    pub fn one(params: &FieldParams) -> Field {
        Field { value: BigUint::one(), modulus: params.modulus().clone() }
    }

    /// Lowers a (possibly negative) integer literal into the field.
    pub fn from_i64(v: i64, params: &FieldParams) -> Field {
        let modulus = params.modulus().clone();
        let value = if v >= 0 {
            BigUint::from(v as u64) % &modulus
        } else {
            let magnitude = BigUint::from((-v) as u64) % &modulus;
            (&modulus - magnitude) % &modulus
        };
        Field { value, modulus }
    }

    /// Reduces an arbitrary `BigUint` into the field.
    pub fn from_biguint(value: BigUint, params: &FieldParams) -> Field {
        let modulus = params.modulus().clone();
        Field { value: value % &modulus, modulus }
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    pub fn is_one(&self) -> bool {
        self.value.is_one()
    }

    pub fn add(&self, other: &Field) -> Field {
        self.same_field(other);
        Field { value: (&self.value + &other.value) % &self.modulus, modulus: self.modulus.clone() }
    }

    pub fn sub(&self, other: &Field) -> Field {
        self.same_field(other);
        let value = if self.value >= other.value {
            &self.value - &other.value
        } else {
            &self.modulus - (&other.value - &self.value)
        };
        Field { value, modulus: self.modulus.clone() }
    }

    pub fn neg(&self) -> Field {
        if self.is_zero() {
            self.clone()
        } else {
            Field { value: &self.modulus - &self.value, modulus: self.modulus.clone() }
        }
    }

    pub fn mul(&self, other: &Field) -> Field {
        self.same_field(other);
        Field { value: (&self.value * &other.value) % &self.modulus, modulus: self.modulus.clone() }
    }

    /// Multiplicative inverse via Fermat's little theorem: `a^(p-2) mod p`.
    pub fn inv(&self) -> Result<Field, WitnessError> {
        if self.is_zero() {
            return Err(WitnessError::DivByZero);
        }
        let exponent = &self.modulus - BigUint::from(2u8);
        let value = self.value.modpow(&exponent, &self.modulus);
        Ok(Field { value, modulus: self.modulus.clone() })
    }

    pub fn div(&self, other: &Field) -> Result<Field, WitnessError> {
        Ok(self.mul(&other.inv()?))
    }

    pub fn to_biguint(&self) -> &BigUint {
        &self.value
    }

    fn same_field(&self, other: &Field) {
        debug_assert_eq!(self.modulus, other.modulus, "operands from different fields");
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}
