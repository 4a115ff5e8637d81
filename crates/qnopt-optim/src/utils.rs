//! Fallible allocation helpers shared by the engines.
//!
//! The history buffer and the inverse-Hessian matrix are sized by the
//! problem, so their allocation goes through `try_reserve_exact` and an
//! overflow-checked element count. Both failures surface as
//! [`ReturnCode::OutOfMemory`].

use qnopt_core::{
    types::{DMatrix, DVector, Scalar},
    ReturnCode,
};

/// Element storage for `elements` zeros, or `OutOfMemory`.
fn try_buffer<T: Scalar>(elements: usize) -> Result<Vec<T>, ReturnCode> {
    let mut data = Vec::new();
    data.try_reserve_exact(elements)
        .map_err(|_| ReturnCode::OutOfMemory)?;
    data.resize(elements, T::zero());
    Ok(data)
}

/// Zero vector of length `n`.
pub(crate) fn try_zeros<T: Scalar>(n: usize) -> Result<DVector<T>, ReturnCode> {
    try_buffer(n).map(DVector::from_vec)
}

/// `n × n` identity matrix.
pub(crate) fn try_identity<T: Scalar>(n: usize) -> Result<DMatrix<T>, ReturnCode> {
    let elements = n.checked_mul(n).ok_or(ReturnCode::OutOfMemory)?;
    let mut matrix = DMatrix::from_vec(n, n, try_buffer(elements)?);
    matrix.fill_with_identity();
    Ok(matrix)
}

/// Total element count of `pairs` vector pairs of length `n`.
pub(crate) fn pair_elements(n: usize, pairs: usize) -> Result<usize, ReturnCode> {
    n.checked_mul(pairs)
        .and_then(|e| e.checked_mul(2))
        .ok_or(ReturnCode::OutOfMemory)
}
