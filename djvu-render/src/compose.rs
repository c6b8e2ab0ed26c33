//! The page composition pipeline.
//!
//! Composition runs through the stages background, mask and foreground, each
//! of which is skipped if the page has no usable layer for it. The output
//! shape is fixed when the renderer is created:
//!
//! - a page whose first stage is the background produces an RGB raster,
//! - a page whose first stage is the mask produces a gray raster.
//!
//! When a page has all three layers, the mask is decoded into a scratch buffer
//! that is kept until the foreground has been drawn through it.

use crate::codec::{self, jpeg, mmr::MmrHeader};
use crate::error::{ComposeError, DecodeError, LayoutError, RenderError, Result, bail};
use crate::geometry::{buffer_len, resample, rotate_into};
use crate::layer::{Coder, Role};
use crate::raster::Raster;
use crate::{BitonalQuery, RenderSettings, RenderWarning};
use djvu_syntax::{Container, PageInfo, Signature};
use log::{debug, warn};

/// A stage of the composition pipeline.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Stage {
    /// The background is decoded next, with the given coder.
    Background(Coder),
    /// The mask is decoded next, with the given coder.
    Mask(Coder),
    /// The foreground is decoded next, with the given coder.
    Foreground(Coder),
    /// Composition has finished.
    Done,
    /// Composition has failed.
    Error(RenderError),
}

/// The result of a successful call to [`PageRenderer::advance`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Step {
    /// More stages remain.
    Next,
    /// The output buffer holds the finished page.
    Last,
}

/// Composes the layers of a page, one stage at a time.
pub struct PageRenderer<'a> {
    page: &'a Container,
    info: PageInfo,
    width: u16,
    height: u16,
    channels: u8,
    counts: [usize; Coder::ALL.len()],
    mask: Option<Coder>,
    foreground: Option<Coder>,
    stage: Stage,
    background_consumed: bool,
    scratch_mask: Option<Vec<u8>>,
    settings: RenderSettings,
}

impl<'a> PageRenderer<'a> {
    /// Prepare the composition of `page`.
    ///
    /// Fails if the page does not start with an INFO chunk, has a zero
    /// dimension, or has neither a usable background nor a usable mask.
    pub fn new(page: &'a Container, settings: &RenderSettings) -> Result<Self> {
        let info = page
            .get(0)
            .filter(|c| c.signature() == Signature::INFO)
            .ok_or(LayoutError::MissingInfo)?;
        let info = PageInfo::from_chunk(info)?;

        if info.width == 0 || info.height == 0 {
            bail!(LayoutError::InvalidDimensions);
        }

        let (width, height) = info.final_dimensions();

        let mut counts = [0; Coder::ALL.len()];
        for (count, coder) in counts.iter_mut().zip(Coder::ALL) {
            *count = page.count(coder.signature(), None);
        }

        let select = |role: Role| {
            role.preference().into_iter().find(|&coder| {
                let present = counts[coder as usize] > 0;

                present && is_available(coder, settings)
            })
        };

        let background = select(Role::Background);
        let mask = select(Role::Mask);
        let foreground = select(Role::Foreground);

        let (stage, channels) = match (background, mask) {
            (Some(bg), _) => (Stage::Background(bg), 3),
            (None, Some(mask)) => (Stage::Mask(mask), 1),
            (None, None) => bail!(LayoutError::NoLayer),
        };

        debug!(
            "composing {}x{} page (rotation {:?}), starting with {:?}",
            width, height, info.rotation, stage
        );

        Ok(Self {
            page,
            info,
            width,
            height,
            channels,
            counts,
            mask,
            foreground,
            stage,
            background_consumed: false,
            scratch_mask: None,
            settings: settings.clone(),
        })
    }

    /// Return the width of the output, after rotation.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Return the height of the output, after rotation.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// Return the number of channels of the output.
    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Return the size of the output buffer in bytes.
    pub fn buffer_len(&self) -> usize {
        self.width as usize * self.height as usize * self.channels as usize
    }

    /// Return the geometry of the page.
    pub fn info(&self) -> &PageInfo {
        &self.info
    }

    /// Return the number of chunks of the page using `coder`.
    pub fn layer_count(&self, coder: Coder) -> usize {
        self.counts[coder as usize]
    }

    /// Return the stage that runs on the next call to [`PageRenderer::advance`].
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Run the next stage, drawing into `out`.
    ///
    /// `out` must have [`PageRenderer::buffer_len`] bytes and must be the same
    /// buffer on every call. Once a stage fails, every later call fails with
    /// the same error.
    pub fn advance(&mut self, out: &mut [u8]) -> Result<Step> {
        let result = match self.stage {
            Stage::Done => return Err(ComposeError::Finished.into()),
            Stage::Error(e) => return Err(e),
            stage => self.run(stage, out),
        };

        match result {
            Ok(next) => {
                debug!("{:?} -> {:?}", self.stage, next);
                self.stage = next;

                Ok(if next == Stage::Done {
                    Step::Last
                } else {
                    Step::Next
                })
            }
            Err(e) => {
                warn!("page composition failed in {:?}: {e}", self.stage);
                self.stage = Stage::Error(e);
                self.scratch_mask = None;

                Err(e)
            }
        }
    }

    fn run(&mut self, stage: Stage, out: &mut [u8]) -> Result<Stage> {
        if out.len() != self.buffer_len() {
            bail!(LayoutError::BufferSize {
                expected: self.buffer_len(),
                found: out.len(),
            });
        }

        match stage {
            Stage::Background(coder) => self.run_background(coder, out),
            Stage::Mask(coder) => self.run_mask(coder, out),
            Stage::Foreground(coder) => self.run_foreground(coder, out),
            Stage::Done | Stage::Error(_) => Ok(stage),
        }
    }

    fn run_background(&mut self, coder: Coder, out: &mut [u8]) -> Result<Stage> {
        let decoded = self.decode_color(coder)?;
        self.rotate(&decoded, 3, out)?;

        Ok(match (self.mask, self.foreground) {
            (Some(mask), Some(_)) => {
                self.background_consumed = true;

                Stage::Mask(mask)
            }
            _ => Stage::Done,
        })
    }

    fn run_mask(&mut self, coder: Coder, out: &mut [u8]) -> Result<Stage> {
        let decoded = self.decode_bitonal(coder)?;

        if self.background_consumed {
            let mut scratch = vec![0; buffer_len(self.width, self.height, 1).unwrap_or(0)];
            self.rotate(&decoded, 1, &mut scratch)?;
            self.scratch_mask = Some(scratch);
        } else {
            self.rotate(&decoded, 1, out)?;
        }

        match self.foreground {
            Some(fg) => Ok(Stage::Foreground(fg)),
            None if self.background_consumed => {
                Err(ComposeError::MaskWithoutForeground.into())
            }
            None => Ok(Stage::Done),
        }
    }

    fn run_foreground(&mut self, coder: Coder, out: &mut [u8]) -> Result<Stage> {
        if !self.background_consumed {
            bail!(ComposeError::ForegroundWithoutMask);
        }

        let mask = self
            .scratch_mask
            .take()
            .ok_or(ComposeError::ForegroundWithoutMask)?;

        let decoded = self.decode_color(coder)?;
        let mut foreground = vec![0; out.len()];
        self.rotate(&decoded, 3, &mut foreground)?;

        let out_pixels: &mut [[u8; 3]] = bytemuck::cast_slice_mut(out);
        let fg_pixels: &[[u8; 3]] = bytemuck::cast_slice(&foreground);

        for ((dst, src), m) in out_pixels.iter_mut().zip(fg_pixels).zip(&mask) {
            if is_ink(*m) {
                *dst = *src;
            }
        }

        Ok(Stage::Done)
    }

    fn rotate(&self, src: &[u8], channels: u8, dst: &mut [u8]) -> Result<()> {
        rotate_into(
            self.info.rotation,
            (self.info.width, self.info.height),
            (self.width, self.height),
            channels,
            src,
            dst,
        )
    }

    fn layer_data(&self, coder: Coder) -> Result<&'a [u8]> {
        let (_, chunk) = self
            .page
            .find(coder.signature(), None, 0)
            .ok_or(DecodeError::MissingChunk)?;

        chunk
            .as_leaf()
            .map(|l| l.data())
            .ok_or(DecodeError::MissingChunk.into())
    }

    /// Decode a color layer at the declared page dimensions.
    fn decode_color(&self, coder: Coder) -> Result<Vec<u8>> {
        if !codec::has_builtin_decoder(coder) {
            bail!(DecodeError::UnsupportedCoder);
        }

        let data = self.layer_data(coder)?;
        let image = jpeg::decode(data).ok_or(DecodeError::Codec)?;
        let declared = (self.info.width, self.info.height);
        let actual = (image.width, image.height);

        if actual == declared {
            return Ok(image.data);
        }

        check_not_larger(actual, declared)?;

        if !self.settings.resample {
            bail!(DecodeError::SmallerThanPage);
        }

        debug!(
            "resampling {:?} layer from {}x{} to {}x{}",
            coder, actual.0, actual.1, declared.0, declared.1
        );
        (self.settings.warning_sink)(RenderWarning::Resampled(coder));

        resample(image.data, actual, declared, 3)
    }

    /// Decode a bitonal layer at the declared page dimensions.
    fn decode_bitonal(&self, coder: Coder) -> Result<Vec<u8>> {
        let decoder = self
            .settings
            .bitonal_decoder
            .as_ref()
            .ok_or(DecodeError::UnsupportedCoder)?;

        let data = self.layer_data(coder)?;
        let declared = (self.info.width, self.info.height);

        if coder == Coder::Smmr {
            let header = MmrHeader::parse(data).ok_or(DecodeError::Codec)?;
            let actual = (header.width, header.height);

            check_not_larger(actual, declared)?;

            if actual != declared {
                bail!(DecodeError::SmallerThanPage);
            }
        }

        let mask = decoder(BitonalQuery {
            coder,
            data,
            width: declared.0,
            height: declared.1,
        })
        .ok_or(DecodeError::Codec)?;

        let expected = buffer_len(declared.0, declared.1, 1).unwrap_or(0);

        if mask.len() != expected {
            bail!(LayoutError::BufferSize {
                expected,
                found: mask.len(),
            });
        }

        Ok(mask)
    }
}

fn check_not_larger(actual: (u16, u16), declared: (u16, u16)) -> Result<()> {
    if actual.0 > declared.0 || actual.1 > declared.1 {
        bail!(DecodeError::LargerThanPage);
    }

    Ok(())
}

/// Whether a mask sample selects the foreground.
#[inline]
fn is_ink(sample: u8) -> bool {
    sample < 128
}

fn is_available(coder: Coder, settings: &RenderSettings) -> bool {
    if coder.is_bitonal() {
        if settings.bitonal_decoder.is_some() {
            return true;
        }

        warn!("skipping {:?} mask, no bitonal decoder configured", coder);
        (settings.warning_sink)(RenderWarning::MissingBitonalDecoder(coder));

        false
    } else if codec::has_builtin_decoder(coder) {
        true
    } else {
        warn!("skipping {:?} layer, coder is not supported", coder);
        (settings.warning_sink)(RenderWarning::UnsupportedCoder(coder));

        false
    }
}

/// Compose a page into a new raster, running all stages.
pub fn render_page(page: &Container, settings: &RenderSettings) -> Result<Raster> {
    let mut renderer = PageRenderer::new(page, settings)?;
    let mut raster = Raster::new(renderer.width(), renderer.height(), renderer.channels());

    while renderer.advance(raster.data_mut())? == Step::Next {}

    Ok(raster)
}
