use ndarray::{s, ArrayView3};

/// A single decoded video frame: contiguous RGB bytes in row-major order.
///
/// `index` is the zero-based position of the frame in decode order.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn as_ndarray(&self) -> ArrayView3<'_, u8> {
        ArrayView3::from_shape(self.shape(), &self.data)
            .expect("Frame data length must match dimensions")
    }

    /// Mirrors the frame about its vertical axis.
    ///
    /// Column order is reversed in every row; the channel bytes of each
    /// pixel keep their order.
    pub fn flip_horizontal(&mut self) {
        let flipped: Vec<u8> = self
            .as_ndarray()
            .slice(s![.., ..;-1, ..])
            .iter()
            .copied()
            .collect();
        self.data = flipped;
    }

    fn shape(&self) -> (usize, usize, usize) {
        (
            self.height as usize,
            self.width as usize,
            self.channels as usize,
        )
    }
}
