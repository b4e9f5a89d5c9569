//! Two-dimensional field storage for derived partition grids
//!
//! Every derived field (column maximum, texture, flags, categories) is an
//! `nx * ny` grid stored as a flat `Vec<T>` in row-major order.

/// Flat row-major 2D field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldData<T> {
    /// Field values in row-major order (y * width + x)
    pub data: Vec<T>,
    /// Grid width in cells
    pub width: usize,
    /// Grid height in cells
    pub height: usize,
}

impl<T: Copy> FieldData<T> {
    /// Create a field with every cell set to `value`
    #[must_use]
    pub fn with_value(width: usize, height: usize, value: T) -> Self {
        Self {
            data: vec![value; width * height],
            width,
            height,
        }
    }

    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Number of cells
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get value at grid position
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> T {
        assert!(
            x < self.width && y < self.height,
            "Coordinates out of bounds"
        );
        self.data[y * self.width + x]
    }

    /// Set value at grid position
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds
    pub fn set(&mut self, x: usize, y: usize, value: T) {
        assert!(
            x < self.width && y < self.height,
            "Coordinates out of bounds"
        );
        self.data[y * self.width + x] = value;
    }

    /// Fill entire field with a value
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Whether the field already has the given shape
    #[must_use]
    pub fn has_shape(&self, width: usize, height: usize) -> bool {
        self.width == width && self.height == height
    }
}
