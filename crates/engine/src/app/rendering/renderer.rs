use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use super::RenderSurface;

/// Copies a [`RenderSurface`] into a `pixels` frame and presents it to the window.
pub struct Presenter {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    buffer_size: (u32, u32),
}

impl Presenter {
    pub fn new(window: Arc<Window>, surface: &RenderSurface) -> Result<Self, Error> {
        let size = window.inner_size();
        let buffer_size = (surface.width(), surface.height());
        let pixels = Self::build_pixels(
            Arc::clone(&window),
            size.width.max(1),
            size.height.max(1),
            buffer_size,
        )?;
        Ok(Self {
            window,
            pixels,
            buffer_size,
        })
    }

    /// Tracks a new window size; zero-sized (minimized) windows are ignored.
    pub fn resize_window(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels.resize_surface(width, height)?;
        Ok(())
    }

    pub fn present(&mut self, surface: &RenderSurface) -> Result<(), Error> {
        let surface_size = (surface.width(), surface.height());
        if surface_size != self.buffer_size {
            self.pixels.resize_buffer(surface_size.0, surface_size.1)?;
            self.buffer_size = surface_size;
        }
        let frame = self.pixels.frame_mut();
        if frame.len() == surface.frame().len() {
            frame.copy_from_slice(surface.frame());
        }
        self.pixels.render()
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    fn build_pixels(
        window: Arc<Window>,
        window_width: u32,
        window_height: u32,
        buffer_size: (u32, u32),
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(window_width, window_height, window);
        Pixels::new(buffer_size.0, buffer_size.1, surface)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presenter_type_is_non_generic() {
        fn assert_sized<T: Sized>() {}
        assert_sized::<Presenter>();
    }
}
