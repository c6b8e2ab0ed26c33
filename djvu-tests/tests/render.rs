use djvu_render::codec::jpeg;
use djvu_render::geometry::rotate_into;
use djvu_render::{
    BitonalQuery, Coder, DecodeError, PageRenderer, RenderError, RenderSettings, RenderWarning,
    Stage, Step, render_page,
};
use djvu_syntax::{Document, NoExternalFiles, PageInfo, Rotation, Signature};
use djvu_tests::{close, flat_jpeg, jpeg, page};
use std::sync::{Arc, Mutex};

const BACKGROUND: [u8; 3] = [200, 40, 40];
const FOREGROUND: [u8; 3] = [30, 60, 210];

fn info(width: u16, height: u16, rotation: Rotation) -> PageInfo {
    PageInfo {
        rotation,
        ..PageInfo::new(width, height)
    }
}

/// Ink in the left half of every row, paper elsewhere.
fn half_mask(width: u16, height: u16) -> Vec<u8> {
    (0..height)
        .flat_map(|_| (0..width).map(move |x| if x < width / 2 { 0 } else { 255 }))
        .collect()
}

fn with_mask(mask: Vec<u8>) -> RenderSettings {
    RenderSettings {
        bitonal_decoder: Some(Arc::new(move |q: BitonalQuery<'_>| {
            (q.coder == Coder::Sjbz).then(|| mask.clone())
        })),
        ..RenderSettings::default()
    }
}

#[test]
fn background_only() {
    let page = page(
        info(16, 8, Rotation::Deg0),
        vec![(Signature::BGJP, flat_jpeg(16, 8, BACKGROUND))],
    );
    let mut renderer = PageRenderer::new(&page, &RenderSettings::default()).unwrap();

    assert_eq!(renderer.stage(), Stage::Background(Coder::BgJp));
    assert_eq!(renderer.channels(), 3);
    assert_eq!(renderer.layer_count(Coder::BgJp), 1);
    assert_eq!(renderer.layer_count(Coder::Bg44), 0);

    let mut out = vec![0; renderer.buffer_len()];
    assert_eq!(renderer.advance(&mut out), Ok(Step::Last));
    assert_eq!(renderer.stage(), Stage::Done);

    assert!(
        out.chunks_exact(3)
            .all(|p| close(p.try_into().unwrap(), BACKGROUND, 4))
    );
}

#[test]
fn background_only_rotated() {
    // Black left half, white right half.
    let bg = jpeg(16, 8, |x, _| if x < 8 { [0; 3] } else { [255; 3] });

    for (rotation, dims, black_corner) in [
        (Rotation::Deg0, (16, 8), (0, 0)),
        (Rotation::Deg180, (16, 8), (15, 7)),
        (Rotation::Deg90, (8, 16), (0, 0)),
        (Rotation::Deg270, (8, 16), (0, 15)),
    ] {
        let page = page(
            info(16, 8, rotation),
            vec![(Signature::BGJP, bg.clone())],
        );
        let raster = render_page(&page, &RenderSettings::default()).unwrap();

        assert_eq!((raster.width(), raster.height()), dims);

        let pixels = raster.rgb_pixels().unwrap();
        let at = |(x, y): (u16, u16)| pixels[y as usize * dims.0 as usize + x as usize];
        let white_corner = (dims.0 - 1 - black_corner.0, dims.1 - 1 - black_corner.1);

        assert!(close(at(black_corner), [0; 3], 8), "{rotation:?}");
        assert!(close(at(white_corner), [255; 3], 8), "{rotation:?}");
    }
}

#[test]
fn three_layers() {
    let (width, height) = (16, 8);
    let bg = flat_jpeg(width, height, BACKGROUND);
    let fg = flat_jpeg(width, height, FOREGROUND);
    let mask = half_mask(width, height);

    let page = page(
        info(width, height, Rotation::Deg0),
        vec![
            (Signature::BGJP, bg.clone()),
            (Signature::SJBZ, b"jb2 data".to_vec()),
            (Signature::FGJP, fg.clone()),
        ],
    );
    let mut renderer = PageRenderer::new(&page, &with_mask(mask.clone())).unwrap();
    let mut out = vec![0; renderer.buffer_len()];

    for coder in [Coder::BgJp, Coder::Sjbz, Coder::FgJp] {
        assert_eq!(renderer.layer_count(coder), 1);
    }
    assert_eq!(renderer.layer_count(Coder::Smmr), 0);

    assert_eq!(renderer.advance(&mut out), Ok(Step::Next));
    assert_eq!(renderer.stage(), Stage::Mask(Coder::Sjbz));
    assert_eq!(renderer.advance(&mut out), Ok(Step::Next));
    assert_eq!(renderer.stage(), Stage::Foreground(Coder::FgJp));
    assert_eq!(renderer.advance(&mut out), Ok(Step::Last));

    let bg = jpeg::decode(&bg).unwrap().data;
    let fg = jpeg::decode(&fg).unwrap().data;

    for (i, pixel) in out.chunks_exact(3).enumerate() {
        let expected = if mask[i] == 0 { &fg } else { &bg };

        assert_eq!(pixel, &expected[i * 3..i * 3 + 3], "pixel {i}");
    }
}

#[test]
fn three_layers_rotated() {
    let (width, height) = (16, 8);
    let bg = jpeg(width, height, |x, y| [x as u8 * 10, y as u8 * 20, 100]);
    let fg = flat_jpeg(width, height, FOREGROUND);
    let mask = half_mask(width, height);

    let page = page(
        info(width, height, Rotation::Deg90),
        vec![
            (Signature::BGJP, bg.clone()),
            (Signature::SJBZ, b"jb2 data".to_vec()),
            (Signature::FGJP, fg.clone()),
        ],
    );
    let raster = render_page(&page, &with_mask(mask.clone())).unwrap();
    assert_eq!((raster.width(), raster.height()), (height, width));

    let rotated = |data: &[u8], channels: u8| {
        let mut out = vec![0; data.len()];
        rotate_into(
            Rotation::Deg90,
            (width, height),
            (height, width),
            channels,
            data,
            &mut out,
        )
        .unwrap();

        out
    };

    let bg = rotated(&jpeg::decode(&bg).unwrap().data, 3);
    let fg = rotated(&jpeg::decode(&fg).unwrap().data, 3);
    let mask = rotated(&mask, 1);

    for (i, pixel) in raster.data().chunks_exact(3).enumerate() {
        let expected = if mask[i] == 0 { &fg } else { &bg };

        assert_eq!(pixel, &expected[i * 3..i * 3 + 3], "pixel {i}");
    }
}

#[test]
fn mask_without_foreground_is_ignored_after_background() {
    let page = page(
        info(16, 8, Rotation::Deg0),
        vec![
            (Signature::BGJP, flat_jpeg(16, 8, BACKGROUND)),
            (Signature::SJBZ, b"jb2 data".to_vec()),
        ],
    );
    let mut renderer = PageRenderer::new(&page, &with_mask(half_mask(16, 8))).unwrap();
    let mut out = vec![0; renderer.buffer_len()];

    // Without a foreground the mask cannot be applied, so the background is final.
    assert_eq!(renderer.advance(&mut out), Ok(Step::Last));
}

#[test]
fn small_background_is_resampled() {
    let warnings = Arc::new(Mutex::new(Vec::new()));
    let sink = warnings.clone();
    let settings = RenderSettings {
        warning_sink: Arc::new(move |w: RenderWarning| sink.lock().unwrap().push(w)),
        ..RenderSettings::default()
    };

    let page = page(
        info(32, 16, Rotation::Deg0),
        vec![(Signature::BGJP, flat_jpeg(16, 8, BACKGROUND))],
    );
    let raster = render_page(&page, &settings).unwrap();

    assert_eq!((raster.width(), raster.height()), (32, 16));
    assert!(
        raster
            .rgb_pixels()
            .unwrap()
            .iter()
            .all(|p| close(*p, BACKGROUND, 6))
    );
    assert_eq!(
        *warnings.lock().unwrap(),
        [RenderWarning::Resampled(Coder::BgJp)]
    );

    let no_resample = RenderSettings {
        resample: false,
        ..RenderSettings::default()
    };
    assert_eq!(
        render_page(&page, &no_resample).unwrap_err(),
        RenderError::Decode(DecodeError::SmallerThanPage)
    );
}

#[test]
fn large_background_fails() {
    let page = page(
        info(8, 8, Rotation::Deg0),
        vec![(Signature::BGJP, flat_jpeg(16, 8, BACKGROUND))],
    );
    let mut renderer = PageRenderer::new(&page, &RenderSettings::default()).unwrap();
    let mut out = vec![0; renderer.buffer_len()];
    let err = RenderError::Decode(DecodeError::LargerThanPage);

    assert_eq!(renderer.advance(&mut out), Err(err));
    assert_eq!(renderer.advance(&mut out), Err(err));
}

#[test]
fn corrupt_jpeg_fails() {
    let page = page(
        info(8, 8, Rotation::Deg0),
        vec![(Signature::BGJP, b"not a jpeg".to_vec())],
    );

    assert_eq!(
        render_page(&page, &RenderSettings::default()).unwrap_err(),
        RenderError::Decode(DecodeError::Codec)
    );
}

#[test]
fn page_from_document() {
    let files = vec![
        page(
            info(16, 8, Rotation::Deg180),
            vec![(Signature::BGJP, flat_jpeg(16, 8, BACKGROUND))],
        )
        .into(),
    ];
    let bytes = Document::bundled(files).unwrap().to_bytes().unwrap();
    let doc = Document::from_bytes(&bytes).unwrap();
    let page = doc.get_page(0, &mut NoExternalFiles).unwrap();

    let raster = render_page(&page, &RenderSettings::default()).unwrap();
    let png = raster.clone().take_png().unwrap();
    let pnm = raster.to_pnm().unwrap();

    assert!(png.starts_with(b"\x89PNG"));
    assert!(pnm.starts_with(b"P6"));
    assert_eq!(jpeg::dimensions(&flat_jpeg(16, 8, BACKGROUND)), Some((16, 8)));
}
