//! Generic `Camera` trait and supporting types for the head camera.

use tictac_types::PlaygroundError;

/// A raw image frame returned by a camera driver.
#[derive(Debug, Clone)]
pub struct CameraFrame {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Raw pixel data, row-major, one byte per pixel per channel.
    pub data: Vec<u8>,
}

impl CameraFrame {
    /// Bytes per pixel implied by the frame size, `None` for an empty or
    /// inconsistent buffer.
    pub fn channels(&self) -> Option<usize> {
        let pixels = (self.width as usize) * (self.height as usize);
        if pixels == 0 || self.data.len() % pixels != 0 {
            return None;
        }
        Some(self.data.len() / pixels)
    }

    /// Copy out the rectangle `[left, right) x [top, bottom)`.
    ///
    /// Returns `None` when the rectangle is empty or leaves the frame.
    pub fn crop(&self, left: u32, right: u32, top: u32, bottom: u32) -> Option<CameraFrame> {
        let channels = self.channels()?;
        if left >= right || top >= bottom || right > self.width || bottom > self.height {
            return None;
        }
        let row_len = self.width as usize * channels;
        let mut data = Vec::with_capacity(((right - left) * (bottom - top)) as usize * channels);
        for y in top..bottom {
            let start = y as usize * row_len + left as usize * channels;
            let end = y as usize * row_len + right as usize * channels;
            data.extend_from_slice(&self.data[start..end]);
        }
        Some(CameraFrame {
            width: right - left,
            height: bottom - top,
            data,
        })
    }
}

/// The camera pointed at the board.
pub trait Camera: Send {
    /// Stable identifier for this camera, e.g. `"head_left"`.
    fn id(&self) -> &str;

    /// Capture and return the next available frame.
    ///
    /// # Errors
    ///
    /// Returns [`PlaygroundError::CameraUnavailable`] if no frame could be
    /// grabbed (device disconnected, empty buffer, ...).
    fn capture(&mut self) -> Result<CameraFrame, PlaygroundError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockCamera {
        id: String,
    }

    impl Camera for MockCamera {
        fn id(&self) -> &str {
            &self.id
        }

        fn capture(&mut self) -> Result<CameraFrame, PlaygroundError> {
            Ok(CameraFrame {
                width: 2,
                height: 2,
                data: vec![0u8; 4 * 3], // 2x2 RGB24
            })
        }
    }

    #[test]
    fn mock_camera_capture() {
        let mut cam = MockCamera {
            id: "head_left".to_string(),
        };
        assert_eq!(cam.id(), "head_left");
        let frame = cam.capture().unwrap();
        assert_eq!(frame.channels(), Some(3));
    }

    #[test]
    fn crop_extracts_rectangle() {
        // 3x2 greyscale:  0 1 2 / 3 4 5
        let frame = CameraFrame {
            width: 3,
            height: 2,
            data: vec![0, 1, 2, 3, 4, 5],
        };
        let sub = frame.crop(1, 3, 0, 2).unwrap();
        assert_eq!(sub.width, 2);
        assert_eq!(sub.height, 2);
        assert_eq!(sub.data, vec![1, 2, 4, 5]);
    }

    #[test]
    fn crop_outside_frame_is_none() {
        let frame = CameraFrame {
            width: 3,
            height: 2,
            data: vec![0; 6],
        };
        assert!(frame.crop(2, 4, 0, 1).is_none());
        assert!(frame.crop(1, 1, 0, 1).is_none());
    }

    #[test]
    fn inconsistent_buffer_has_no_channels() {
        let frame = CameraFrame {
            width: 2,
            height: 2,
            data: vec![0; 5],
        };
        assert_eq!(frame.channels(), None);
    }
}
