// Copyright 2020 @TwoCookingMice

use super::constants::{ Float, Vector3f };

use std::ops;
use std::vec::Vec;

/// In-memory RGB radiance image, row-major with `(x, y)` indexing.
#[derive(Debug, Clone)]
pub struct Bitmap {
    data: Vec<Vector3f>,
    height: usize,
    width: usize
}

impl ops::Index<(usize, usize)> for Bitmap {
    type Output = Vector3f;

    fn index(&self, index: (usize, usize)) -> &Vector3f {
        &self.data[index.0 + self.width * index.1]
    }
}

impl ops::IndexMut<(usize, usize)> for Bitmap {
    fn index_mut(&mut self, index: (usize, usize)) -> &mut Vector3f {
        &mut self.data[index.0 + self.width * index.1]
    }
}

impl Bitmap {
    pub fn new(width: usize, height: usize) -> Self {
        let pixel_number = width * height;
        Self { data: vec!(Vector3f::new(0.0, 0.0, 0.0);
                          pixel_number),
               width,
               height }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[Vector3f] {
        &self.data
    }

    pub fn mean(&self) -> Vector3f {
        if self.data.is_empty() {
            return Vector3f::zeros();
        }
        let sum = self.data.iter().fold(Vector3f::zeros(), |acc, p| acc + p);
        sum / (self.data.len() as Float)
    }
}

/* Test for Bitmap */
#[cfg(test)]
mod tests {
    use super::Bitmap;
    use super::Vector3f;

    #[test]
    fn test_bitmap_basic_functions() {
        let mut bitmap = Bitmap::new(256usize, 128usize);
        assert_eq!(bitmap.width(), 256);
        assert_eq!(bitmap.height(), 128);
        assert_eq!(bitmap.pixels().len(), 256 * 128);

        bitmap[(5, 6)] = Vector3f::new(1.0, 0.5, 0.6);
        assert_eq!(bitmap[(5, 6)][0], 1.0);
        assert_eq!(bitmap[(2, 6)][0], 0.0);
    }

    #[test]
    fn test_bitmap_mean() {
        let mut bitmap = Bitmap::new(2, 1);
        bitmap[(0, 0)] = Vector3f::new(1.0, 2.0, 0.0);
        bitmap[(1, 0)] = Vector3f::new(3.0, 0.0, 0.0);
        assert_eq!(bitmap.mean(), Vector3f::new(2.0, 1.0, 0.0));
        assert_eq!(Bitmap::new(0, 0).mean(), Vector3f::zeros());
    }
}
