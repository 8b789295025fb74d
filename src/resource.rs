use crate::error::RenderError;

/// Flat, typed buffer backing render targets, depth buffers and mesh data.
///
/// Constructed either linear (`new`) or 2D (`new_2d`, stride = width).
/// There is no resize: a resolution or mesh change builds a new resource.
pub struct Resource<T> {
    data: Vec<T>,
    stride: usize,
}

impl<T: Copy + Default> Resource<T> {
    /// Linear resource of `size` default-initialized elements.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![T::default(); size],
            stride: 0,
        }
    }

    /// 2D resource of `width * height` elements, addressable by (x, y).
    pub fn new_2d(width: usize, height: usize) -> Self {
        Self {
            data: vec![T::default(); width * height],
            stride: width,
        }
    }
}

impl<T: Copy> Resource<T> {
    /// Linear resource taking ownership of existing data.
    pub fn from_vec(data: Vec<T>) -> Self {
        Self { data, stride: 0 }
    }

    pub fn count(&self) -> usize {
        self.data.len()
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len() * std::mem::size_of::<T>()
    }

    /// Row stride in elements; 0 for linear resources.
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn width(&self) -> usize {
        self.stride
    }

    pub fn height(&self) -> usize {
        if self.stride == 0 {
            0
        } else {
            self.data.len() / self.stride
        }
    }

    pub fn item(&self, index: usize) -> Result<&T, RenderError> {
        self.data.get(index).ok_or(RenderError::OutOfRange {
            index,
            count: self.data.len(),
        })
    }

    pub fn item_mut(&mut self, index: usize) -> Result<&mut T, RenderError> {
        let count = self.data.len();
        self.data
            .get_mut(index)
            .ok_or(RenderError::OutOfRange { index, count })
    }

    pub fn item_2d(&self, x: usize, y: usize) -> Result<&T, RenderError> {
        self.item(self.index_2d(x, y)?)
    }

    pub fn item_2d_mut(&mut self, x: usize, y: usize) -> Result<&mut T, RenderError> {
        let index = self.index_2d(x, y)?;
        self.item_mut(index)
    }

    fn index_2d(&self, x: usize, y: usize) -> Result<usize, RenderError> {
        if self.stride == 0 || x >= self.stride {
            return Err(RenderError::OutOfRange {
                index: x,
                count: self.stride,
            });
        }
        Ok(y * self.stride + x)
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }
}
