// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Variant: a scalar or array of any describable type.
//!
//! The array state is an explicit enum (undefined, empty, scalar, array), so
//! classification never depends on pointer tricks. Multidimensional arrays
//! are stored flattened in row-major order, last dimension varying fastest.

use std::fmt;
use std::sync::Arc;

use super::catalog::catalog;
use super::numeric_range::{NumericRange, RangeDimension};
use super::runtime;
use super::{ByteString, DataType, StatusCode, TypeKind, UaResult, UaString, Value};

/// Content of a [`Variant`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum VariantData {
    /// No type, no value.
    #[default]
    Empty,
    /// Typed null array (wire length `-1`).
    UndefinedArray,
    /// Typed array of length zero.
    EmptyArray,
    Scalar(Value),
    /// Non-empty array.
    Array(Vec<Value>),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Variant {
    data_type: Option<Arc<DataType>>,
    data: VariantData,
    array_dimensions: Option<Vec<u32>>,
}

impl Variant {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Scalar variant taking ownership of `value`.
    pub fn scalar(data_type: Arc<DataType>, value: Value) -> Self {
        Self {
            data_type: Some(data_type),
            data: VariantData::Scalar(value),
            array_dimensions: None,
        }
    }

    /// Array variant taking ownership of `values`. An empty vector gives the
    /// empty array.
    pub fn array(data_type: Arc<DataType>, values: Vec<Value>) -> Self {
        let data = if values.is_empty() {
            VariantData::EmptyArray
        } else {
            VariantData::Array(values)
        };
        Self {
            data_type: Some(data_type),
            data,
            array_dimensions: None,
        }
    }

    pub fn undefined_array(data_type: Arc<DataType>) -> Self {
        Self {
            data_type: Some(data_type),
            data: VariantData::UndefinedArray,
            array_dimensions: None,
        }
    }

    /// Scalar of a builtin value, typed from the namespace-zero catalog.
    pub fn from_builtin(value: Value) -> Option<Self> {
        let kind = value.builtin_kind()?;
        let ty = catalog().builtins.get(kind)?;
        Some(Self::scalar(Arc::clone(ty), value))
    }

    pub fn set_scalar(&mut self, value: Value, data_type: Arc<DataType>) {
        *self = Self::scalar(data_type, value);
    }

    /// Deep-copy `value` into the variant. The variant is unchanged on error.
    pub fn set_scalar_copy(&mut self, value: &Value, data_type: &Arc<DataType>) -> UaResult<()> {
        let copy = runtime::copy(value, data_type)?;
        *self = Self::scalar(Arc::clone(data_type), copy);
        Ok(())
    }

    pub fn set_array(&mut self, values: Vec<Value>, data_type: Arc<DataType>) {
        *self = Self::array(data_type, values);
    }

    /// Deep-copy `values` into the variant. The variant is unchanged on error.
    pub fn set_array_copy(&mut self, values: &[Value], data_type: &Arc<DataType>) -> UaResult<()> {
        let copy = runtime::array_copy(values, data_type)?;
        *self = Self::array(Arc::clone(data_type), copy);
        Ok(())
    }

    pub fn data_type(&self) -> Option<&Arc<DataType>> {
        self.data_type.as_ref()
    }

    pub fn data(&self) -> &VariantData {
        &self.data
    }

    pub fn into_data(self) -> (Option<Arc<DataType>>, VariantData) {
        (self.data_type, self.data)
    }

    pub fn is_empty(&self) -> bool {
        self.data_type.is_none()
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self.data, VariantData::Scalar(_))
    }

    pub fn is_undefined_array(&self) -> bool {
        matches!(self.data, VariantData::UndefinedArray)
    }

    pub fn is_empty_array(&self) -> bool {
        matches!(self.data, VariantData::EmptyArray)
    }

    /// Any of the three array states.
    pub fn is_array(&self) -> bool {
        matches!(
            self.data,
            VariantData::UndefinedArray | VariantData::EmptyArray | VariantData::Array(_)
        )
    }

    pub fn has_scalar_type(&self, ty: &DataType) -> bool {
        self.is_scalar() && self.data_type.as_deref() == Some(ty)
    }

    pub fn has_array_type(&self, ty: &DataType) -> bool {
        self.is_array() && self.data_type.as_deref() == Some(ty)
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match &self.data {
            VariantData::Scalar(v) => Some(v),
            _ => None,
        }
    }

    /// Array elements; an empty slice for the empty and undefined arrays.
    pub fn as_array(&self) -> Option<&[Value]> {
        match &self.data {
            VariantData::Array(values) => Some(values),
            VariantData::EmptyArray | VariantData::UndefinedArray => Some(&[]),
            _ => None,
        }
    }

    pub fn array_length(&self) -> usize {
        match &self.data {
            VariantData::Array(values) => values.len(),
            _ => 0,
        }
    }

    pub fn array_dimensions(&self) -> Option<&[u32]> {
        self.array_dimensions.as_deref()
    }

    /// Attach matrix dimensions to an array. Their product must equal the
    /// array length.
    pub fn set_array_dimensions(&mut self, dimensions: Vec<u32>) -> UaResult<()> {
        if !self.is_array() || dimensions.is_empty() {
            return Err(StatusCode::BAD_INVALID_ARGUMENT);
        }
        let product = dimensions
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d as usize))
            .ok_or(StatusCode::BAD_INVALID_ARGUMENT)?;
        if product != self.array_length() {
            log::debug!(
                "[variant] dimensions {:?} do not match length {}",
                dimensions,
                self.array_length()
            );
            return Err(StatusCode::BAD_INVALID_ARGUMENT);
        }
        self.array_dimensions = Some(dimensions);
        Ok(())
    }

    pub fn clear_array_dimensions(&mut self) {
        self.array_dimensions = None;
    }

    /// Release the content and return to the empty variant.
    pub fn clear(&mut self) {
        *self = Self::empty();
    }

    /// Fallible deep copy.
    pub fn try_clone(&self) -> UaResult<Variant> {
        let Some(ty) = &self.data_type else {
            return Ok(Self::empty());
        };
        let data = match &self.data {
            VariantData::Empty => VariantData::Empty,
            VariantData::UndefinedArray => VariantData::UndefinedArray,
            VariantData::EmptyArray => VariantData::EmptyArray,
            VariantData::Scalar(v) => VariantData::Scalar(runtime::copy(v, ty)?),
            VariantData::Array(values) => VariantData::Array(runtime::array_copy(values, ty)?),
        };
        let array_dimensions = match &self.array_dimensions {
            Some(dims) => {
                let mut out = Vec::new();
                out.try_reserve_exact(dims.len())?;
                out.extend_from_slice(dims);
                Some(out)
            }
            None => None,
        };
        Ok(Self {
            data_type: Some(Arc::clone(ty)),
            data,
            array_dimensions,
        })
    }

    /// Logical dimensions of the array content.
    fn dims(&self) -> Vec<usize> {
        match &self.array_dimensions {
            Some(dims) => dims.iter().map(|&d| d as usize).collect(),
            None => vec![self.array_length()],
        }
    }

    /// Copy the sub-rectangle addressed by `range` into a new variant.
    ///
    /// On a scalar String or ByteString a one-dimensional range selects a
    /// substring. On a String or ByteString array one extra trailing range
    /// dimension is applied to every selected element.
    pub fn copy_range(&self, range: &NumericRange) -> UaResult<Variant> {
        let ty = self.data_type.as_ref().ok_or(StatusCode::BAD_INDEX_RANGE_NO_DATA)?;
        match &self.data {
            VariantData::Empty | VariantData::UndefinedArray | VariantData::EmptyArray => {
                Err(StatusCode::BAD_INDEX_RANGE_NO_DATA)
            }
            VariantData::Scalar(value) => {
                if is_string_like(ty) {
                    if range.len() != 1 {
                        return Err(StatusCode::BAD_INDEX_RANGE_INVALID);
                    }
                    let sub = substring(value, range.dimensions()[0])?;
                    return Ok(Self::scalar(Arc::clone(ty), sub));
                }
                // A scalar behaves as a one-element array.
                if range.len() != 1 || range.dimensions()[0] != RangeDimension::single(0) {
                    return Err(StatusCode::BAD_INDEX_RANGE_INVALID);
                }
                Ok(Self::scalar(Arc::clone(ty), runtime::copy(value, ty)?))
            }
            VariantData::Array(values) => {
                let dims = self.dims();
                let (outer, inner) = split_range(range, dims.len(), ty)?;
                let indices = select_indices(&dims, outer)?;

                let mut out = Vec::new();
                out.try_reserve_exact(indices.len())?;
                for idx in indices {
                    let element = &values[idx];
                    out.push(match inner {
                        Some(dim) => substring(element, dim)?,
                        None => runtime::copy(element, ty)?,
                    });
                }

                let mut result = Self::array(Arc::clone(ty), out);
                if dims.len() > 1 {
                    result.array_dimensions = Some(outer.iter().map(|d| d.count() as u32).collect());
                }
                Ok(result)
            }
        }
    }

    /// Replace the sub-rectangle addressed by `range` with `values`, taking
    /// ownership of them. Fails without touching the variant when the
    /// number of values differs from the addressed element count.
    pub fn set_range(&mut self, values: Vec<Value>, range: &NumericRange) -> UaResult<()> {
        let ty = self.data_type.clone().ok_or(StatusCode::BAD_INDEX_RANGE_NO_DATA)?;
        let dims = self.dims();
        let target = match &mut self.data {
            VariantData::Array(target) => target,
            VariantData::Scalar(_) => return Err(StatusCode::BAD_INDEX_RANGE_INVALID),
            _ => return Err(StatusCode::BAD_INDEX_RANGE_NO_DATA),
        };
        if range.len() != dims.len() {
            return Err(StatusCode::BAD_INDEX_RANGE_INVALID);
        }
        let indices = select_indices(&dims, range.dimensions())?;
        if indices.len() != values.len() {
            log::debug!(
                "[variant] range {} addresses {} elements, got {}",
                range,
                indices.len(),
                values.len()
            );
            return Err(StatusCode::BAD_INDEX_RANGE_INVALID);
        }
        for value in &values {
            runtime::check_value(value, &ty).map_err(|_| StatusCode::BAD_TYPE_MISMATCH)?;
        }
        for (idx, value) in indices.into_iter().zip(values) {
            target[idx] = value;
        }
        Ok(())
    }

    /// Like [`Variant::set_range`] but deep-copies `values` first.
    pub fn set_range_copy(&mut self, values: &[Value], range: &NumericRange) -> UaResult<()> {
        let ty = self.data_type.clone().ok_or(StatusCode::BAD_INDEX_RANGE_NO_DATA)?;
        let copy = runtime::array_copy(values, &ty)?;
        self.set_range(copy, range)
    }
}

fn is_string_like(ty: &DataType) -> bool {
    matches!(ty.kind, TypeKind::String | TypeKind::ByteString)
}

/// Split `range` into the array part and an optional trailing string part.
fn split_range<'r>(
    range: &'r NumericRange,
    array_rank: usize,
    ty: &DataType,
) -> UaResult<(&'r [RangeDimension], Option<RangeDimension>)> {
    let dims = range.dimensions();
    if dims.len() == array_rank {
        Ok((dims, None))
    } else if dims.len() == array_rank + 1 && is_string_like(ty) {
        Ok((&dims[..array_rank], Some(dims[array_rank])))
    } else {
        Err(StatusCode::BAD_INDEX_RANGE_INVALID)
    }
}

/// Flat indices of the addressed sub-rectangle in row-major order.
fn select_indices(dims: &[usize], range: &[RangeDimension]) -> UaResult<Vec<usize>> {
    if dims.len() != range.len() {
        return Err(StatusCode::BAD_INDEX_RANGE_INVALID);
    }
    for (dim, r) in dims.iter().zip(range) {
        if r.min > r.max || r.max as usize >= *dim {
            return Err(StatusCode::BAD_INDEX_RANGE_INVALID);
        }
    }

    let mut strides = vec![1usize; dims.len()];
    for i in (0..dims.len().saturating_sub(1)).rev() {
        strides[i] = strides[i + 1] * dims[i + 1];
    }

    let count: usize = range.iter().map(RangeDimension::count).product();
    let mut out = Vec::new();
    out.try_reserve_exact(count)?;

    let mut cursor: Vec<u32> = range.iter().map(|r| r.min).collect();
    loop {
        out.push(
            cursor
                .iter()
                .zip(&strides)
                .map(|(&i, &stride)| i as usize * stride)
                .sum(),
        );
        // Odometer increment, last dimension fastest.
        let mut d = cursor.len();
        loop {
            if d == 0 {
                return Ok(out);
            }
            d -= 1;
            if cursor[d] < range[d].max {
                cursor[d] += 1;
                break;
            }
            cursor[d] = range[d].min;
        }
    }
}

fn substring(value: &Value, dim: RangeDimension) -> UaResult<Value> {
    match value {
        Value::ByteString(bytes) => {
            let data = bytes.as_bytes().ok_or(StatusCode::BAD_INDEX_RANGE_NO_DATA)?;
            if dim.max as usize >= data.len() {
                return Err(StatusCode::BAD_INDEX_RANGE_INVALID);
            }
            Ok(Value::ByteString(ByteString::from(
                &data[dim.min as usize..=dim.max as usize],
            )))
        }
        Value::String(text) => {
            let text = text.as_str().ok_or(StatusCode::BAD_INDEX_RANGE_NO_DATA)?;
            if dim.max as usize >= text.chars().count() {
                return Err(StatusCode::BAD_INDEX_RANGE_INVALID);
            }
            let sub: String = text
                .chars()
                .skip(dim.min as usize)
                .take(dim.count())
                .collect();
            Ok(Value::String(UaString::from(sub)))
        }
        _ => Err(StatusCode::BAD_INDEX_RANGE_INVALID),
    }
}

macro_rules! impl_variant_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Variant {
                fn from(v: $ty) -> Self {
                    Variant::from_builtin(Value::from(v)).unwrap_or_default()
                }
            }
        )*
    };
}

impl_variant_from!(bool, i8, u8, i16, u16, i32, u32, i64, u64, f32, f64, &str, UaString, ByteString);

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(ty) = &self.data_type else {
            return f.write_str("Empty");
        };
        match &self.data {
            VariantData::Empty => f.write_str("Empty"),
            VariantData::UndefinedArray => write!(f, "{}[null]", ty.name),
            VariantData::EmptyArray => write!(f, "{}[]", ty.name),
            VariantData::Scalar(v) => write!(f, "{}({})", ty.name, v),
            VariantData::Array(values) => match &self.array_dimensions {
                Some(dims) => write!(f, "{}{:?}", ty.name, dims),
                None => write!(f, "{}[{}]", ty.name, values.len()),
            },
        }
    }
}
