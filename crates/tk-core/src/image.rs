use crate::Error;

/// Dense row-major raster, used for boundary display matrices.
#[derive(Debug, Clone, PartialEq)]
pub struct Image<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T> Image<T> {
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Result<Self, Error> {
        let expected = width.checked_mul(height).ok_or(Error::SizeMismatch {
            expected: usize::MAX,
            actual: data.len(),
        })?;

        if data.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn into_data(self) -> Vec<T> {
        self.data
    }

    pub fn row(&self, y: usize) -> Option<&[T]> {
        if y >= self.height {
            return None;
        }
        let start = y * self.width;
        self.data.get(start..start + self.width)
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x)
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> Option<&mut T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get_mut(y * self.width + x)
    }
}

impl<T: Clone> Image<T> {
    pub fn new_fill(width: usize, height: usize, value: T) -> Result<Self, Error> {
        let len = width.checked_mul(height).ok_or(Error::SizeMismatch {
            expected: usize::MAX,
            actual: 0,
        })?;
        Ok(Self {
            width,
            height,
            data: vec![value; len],
        })
    }
}

impl<T: Copy> Image<T> {
    pub fn map<U>(&self, f: impl Fn(T) -> U) -> Image<U> {
        Image {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Image;
    use crate::Error;

    #[test]
    fn indexing_is_row_major() {
        let img = Image::from_vec(3, 2, vec![1u8, 2, 3, 4, 5, 6]).expect("valid image");

        assert_eq!(img.row(0), Some(&[1, 2, 3][..]));
        assert_eq!(img.row(1), Some(&[4, 5, 6][..]));
        assert_eq!(img.row(2), None);
        assert_eq!(img.get(0, 1), Some(&4));
        assert_eq!(img.get(2, 1), Some(&6));
        assert_eq!(img.get(3, 1), None);
        assert_eq!(img.get(0, 2), None);
    }

    #[test]
    fn from_vec_rejects_wrong_len() {
        let err = Image::from_vec(2, 2, vec![0u8; 3]).expect_err("length mismatch");
        assert_eq!(
            err,
            Error::SizeMismatch {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn fill_then_write_and_map() {
        let mut img = Image::new_fill(2, 2, 0u8).expect("small image");
        *img.get_mut(1, 0).expect("in bounds") = 1;

        let vis = img.map(|v| if v > 0 { 255u8 } else { 0 });
        assert_eq!(vis.data(), &[0, 255, 0, 0]);
    }
}
