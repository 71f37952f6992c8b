//! Arity checking shared between ordinary calls and generic
//! instantiation.

use gosym_diagnostic::{arity_mismatch, Error};
use gosym_ir::{FieldType, FunctionInfo, Name};

#[derive(Clone, Debug)]
pub struct FunctionSignature {
    pub type_params: Vec<Name>,
    pub params: Vec<FieldType>,
    pub is_variadic: bool,
    pub results: Vec<FieldType>,
}

impl FunctionSignature {
    pub fn from_function_info(info: &FunctionInfo) -> Self {
        FunctionSignature {
            type_params: info.type_params.clone(),
            params: info.params.clone(),
            is_variadic: info.is_variadic,
            results: info.results.clone(),
        }
    }

    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }

    /// Minimum number of positional arguments a call must supply.
    pub fn min_arity(&self) -> usize {
        if self.is_variadic {
            self.params.len().saturating_sub(1)
        } else {
            self.params.len()
        }
    }

    /// Check that `arg_count` arguments satisfy this signature's arity,
    /// accounting for variadic collection of the trailing parameter.
    pub fn check_arity(&self, arg_count: usize) -> Result<(), Error> {
        if self.is_variadic {
            if arg_count < self.min_arity() {
                return Err(arity_mismatch(self.min_arity(), arg_count, None));
            }
        } else if arg_count != self.params.len() {
            return Err(arity_mismatch(self.params.len(), arg_count, None));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gosym_ir::StringInterner;

    fn sig(params: usize, variadic: bool) -> FunctionSignature {
        let interner = StringInterner::new();
        FunctionSignature {
            type_params: Vec::new(),
            params: (0..params)
                .map(|i| FieldType::simple(interner.intern(&format!("p{i}"))))
                .collect(),
            is_variadic: variadic,
            results: Vec::new(),
        }
    }

    #[test]
    fn exact_arity_matches() {
        assert!(sig(2, false).check_arity(2).is_ok());
    }

    #[test]
    fn wrong_arity_errors() {
        assert!(sig(2, false).check_arity(1).is_err());
    }

    #[test]
    fn variadic_accepts_more_than_minimum() {
        let signature = sig(2, true);
        assert!(signature.check_arity(1).is_ok());
        assert!(signature.check_arity(5).is_ok());
        assert!(signature.check_arity(0).is_err());
    }
}
