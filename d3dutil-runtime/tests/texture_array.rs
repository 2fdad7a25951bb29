use d3dutil_common::{ImageFormat, Size};
use d3dutil_runtime::error::{ImageError, TextureArrayError};
use d3dutil_runtime::headless::{HeadlessContext, HeadlessDevice, HeadlessMapping};
use d3dutil_runtime::image::TextureData;
use d3dutil_runtime::texture_array::{
    build_texture_array, calc_subresource, TextureArrayDesc, TextureContext, TextureDesc,
    TextureDevice,
};
use std::path::{Path, PathBuf};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// An R8G8B8A8 texture with a full mip chain, every byte derived from `seed`.
fn rgba_texture(size: Size<u32>, mip_levels: u32, seed: u8) -> TextureData {
    let format = ImageFormat::R8G8B8A8Unorm;
    let mips = (0..mip_levels)
        .map(|level| {
            let len = format.surface_size(size.scale_mipmap(level)) as usize;
            (0..len)
                .map(|i| seed.wrapping_mul(31).wrapping_add(level as u8 * 7) ^ i as u8)
                .collect()
        })
        .collect();
    TextureData::from_packed_mips(format, size, mips).unwrap()
}

fn write_dds(dir: &Path, name: &str, texture: &TextureData) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, texture.to_dds_bytes()).unwrap();
    path
}

#[test]
fn copies_every_mip_into_its_slice() {
    init();
    let dir = tempfile::tempdir().unwrap();
    let sources: Vec<_> = (0..4)
        .map(|i| rgba_texture(Size::new(16, 8), 5, i))
        .collect();
    let paths: Vec<_> = sources
        .iter()
        .enumerate()
        .map(|(i, texture)| write_dds(dir.path(), &format!("tree{i}.dds"), texture))
        .collect();

    let device = HeadlessDevice::new();
    let context = HeadlessContext::new();
    let array = build_texture_array(Some(&device), Some(&context), &paths, 0)
        .unwrap()
        .unwrap();

    let desc = array.desc();
    assert_eq!(desc.size, Size::new(16, 8));
    assert_eq!(desc.mip_levels, 5);
    assert_eq!(desc.array_size, 4);
    assert_eq!(desc.format, ImageFormat::R8G8B8A8Unorm);

    for (slice, source) in sources.iter().enumerate() {
        for mip in 0..desc.mip_levels {
            let subresource = calc_subresource(mip, slice as u32, desc.mip_levels);
            let copied = array.texture().read_subresource(subresource).unwrap();
            assert_eq!(
                copied, source.mips[mip as usize].bytes,
                "slice {slice} mip {mip}"
            );
        }
    }

    assert_eq!(device.staging_created(), 4);
    assert_eq!(context.maps(), 20);
    assert_eq!(context.updates(), 20);
    assert_eq!(context.rejected_updates(), 0);
    assert_eq!(context.unmaps(), context.maps());
}

#[test]
fn view_covers_the_whole_array() {
    init();
    let dir = tempfile::tempdir().unwrap();
    let paths = [
        write_dds(dir.path(), "a.dds", &rgba_texture(Size::new(4, 4), 3, 1)),
        write_dds(dir.path(), "b.dds", &rgba_texture(Size::new(4, 4), 3, 2)),
    ];

    let device = HeadlessDevice::new();
    let context = HeadlessContext::new();
    let (texture, view) = build_texture_array(Some(&device), Some(&context), &paths, 0)
        .unwrap()
        .unwrap()
        .into_parts();

    let desc = view.desc();
    assert_eq!(desc.format, ImageFormat::R8G8B8A8Unorm);
    assert_eq!(desc.most_detailed_mip, 0);
    assert_eq!(desc.mip_levels, 3);
    assert_eq!(desc.first_array_slice, 0);
    assert_eq!(desc.array_size, 2);

    // the view keeps the texture alive on its own
    drop(texture);
    assert_eq!(view.texture().handle_count(), 1);
    assert!(view.texture().read_subresource(5).is_some());
}

#[test]
fn missing_device_or_context_loads_nothing() {
    init();
    let paths = ["does/not/exist.dds"];
    let device = HeadlessDevice::new();
    let context = HeadlessContext::new();

    let result = build_texture_array::<HeadlessDevice, _, _>(None, Some(&context), &paths, 0);
    assert!(matches!(result, Ok(None)));

    let result = build_texture_array::<_, HeadlessContext, _>(Some(&device), None, &paths, 0);
    assert!(matches!(result, Ok(None)));

    assert_eq!(device.staging_created(), 0);
    assert_eq!(context.maps(), 0);
}

#[test]
fn empty_path_list_is_an_error() {
    init();
    let device = HeadlessDevice::new();
    let context = HeadlessContext::new();
    let paths: [&str; 0] = [];

    let result = build_texture_array(Some(&device), Some(&context), &paths, 0);
    assert!(matches!(result, Err(TextureArrayError::NoSources)));
}

#[test]
fn missing_source_is_reported_with_its_path() {
    init();
    let dir = tempfile::tempdir().unwrap();
    let good = write_dds(dir.path(), "good.dds", &rgba_texture(Size::new(4, 4), 1, 0));
    let missing = dir.path().join("missing.dds");

    let device = HeadlessDevice::new();
    let context = HeadlessContext::new();
    let result = build_texture_array(
        Some(&device),
        Some(&context),
        &[good, missing.clone()],
        0,
    );

    assert!(matches!(result, Err(TextureArrayError::ImageLoad(path, _)) if path == missing));
    assert_eq!(context.maps(), 0);
}

/// Overwrite a `u32` field of the DDS header that follows the magic.
fn patch_header(path: &Path, field_offset: usize, value: u32) {
    let mut bytes = std::fs::read(path).unwrap();
    let at = 4 + field_offset;
    bytes[at..at + 4].copy_from_slice(&value.to_le_bytes());
    std::fs::write(path, bytes).unwrap();
}

#[test]
fn corrupt_headers_are_load_errors() {
    init();
    const WIDTH: usize = 12;
    const MIP_MAP_COUNT: usize = 24;

    let dir = tempfile::tempdir().unwrap();
    for (name, field, value) in [
        ("huge_mips.dds", MIP_MAP_COUNT, u32::MAX),
        ("extra_mips.dds", MIP_MAP_COUNT, 6),
        ("wide.dds", WIDTH, 0x4000_0001),
    ] {
        let good = write_dds(dir.path(), "good.dds", &rgba_texture(Size::new(4, 4), 3, 0));
        let corrupt = write_dds(dir.path(), name, &rgba_texture(Size::new(4, 4), 3, 1));
        patch_header(&corrupt, field, value);

        let device = HeadlessDevice::new();
        let context = HeadlessContext::new();
        let result = build_texture_array(
            Some(&device),
            Some(&context),
            &[good, corrupt.clone()],
            0,
        );

        match result {
            Err(TextureArrayError::ImageLoad(path, ImageError::InvalidDds(_))) => {
                assert_eq!(path, corrupt)
            }
            other => panic!("{name}: unexpected result {other:?}"),
        }
        assert_eq!(context.maps(), 0);
    }
}

#[test]
fn mismatched_sources_are_rejected() {
    init();
    let dir = tempfile::tempdir().unwrap();
    let first = rgba_texture(Size::new(8, 8), 4, 0);
    let base = write_dds(dir.path(), "base.dds", &first);

    let expected = TextureDesc {
        size: Size::new(8, 8),
        mip_levels: 4,
        format: ImageFormat::R8G8B8A8Unorm,
    };

    let cases = [
        (
            "size.dds",
            rgba_texture(Size::new(16, 16), 4, 1),
            TextureDesc {
                size: Size::new(16, 16),
                ..expected
            },
        ),
        (
            "mips.dds",
            rgba_texture(Size::new(8, 8), 2, 1),
            TextureDesc {
                mip_levels: 2,
                ..expected
            },
        ),
        (
            "format.dds",
            TextureData::from_packed_mips(
                ImageFormat::B8G8R8A8Unorm,
                Size::new(8, 8),
                first.mips.iter().map(|mip| mip.bytes.clone()).collect(),
            )
            .unwrap(),
            TextureDesc {
                format: ImageFormat::B8G8R8A8Unorm,
                ..expected
            },
        ),
    ];

    for (name, texture, actual_desc) in cases {
        let odd = write_dds(dir.path(), name, &texture);
        let device = HeadlessDevice::new();
        let context = HeadlessContext::new();

        let result = build_texture_array(
            Some(&device),
            Some(&context),
            &[base.clone(), odd.clone()],
            0,
        );

        match result {
            Err(TextureArrayError::MismatchedSource {
                index,
                path,
                expected: reported,
                actual,
            }) => {
                assert_eq!(index, 1, "{name}");
                assert_eq!(path, odd);
                assert_eq!(reported, expected);
                assert_eq!(actual, actual_desc);
            }
            other => panic!("{name}: unexpected result {other:?}"),
        }
        assert_eq!(context.maps(), 0);
    }
}

#[test]
fn mip_cap_applies_to_every_slice() {
    init();
    let dir = tempfile::tempdir().unwrap();
    let sources = [
        rgba_texture(Size::new(32, 32), 6, 3),
        rgba_texture(Size::new(32, 32), 6, 4),
    ];
    let paths: Vec<_> = sources
        .iter()
        .enumerate()
        .map(|(i, texture)| write_dds(dir.path(), &format!("{i}.dds"), texture))
        .collect();

    let device = HeadlessDevice::new();
    let context = HeadlessContext::new();
    let array = build_texture_array(Some(&device), Some(&context), &paths, 2)
        .unwrap()
        .unwrap();

    assert_eq!(array.desc().mip_levels, 2);
    assert_eq!(array.desc().size, Size::new(32, 32));
    let second_slice_top = calc_subresource(0, 1, 2);
    assert_eq!(
        array.texture().read_subresource(second_slice_top).unwrap(),
        sources[1].mips[0].bytes
    );
    assert!(array.texture().read_subresource(4).is_none());
}

#[test]
fn block_compressed_sources_keep_their_format() {
    init();
    let dir = tempfile::tempdir().unwrap();
    let format = ImageFormat::Bc1Unorm;
    let size = Size::new(8, 8);
    let make = |seed: u8| {
        let mips = (0..4)
            .map(|level| {
                let len = format.surface_size(size.scale_mipmap(level)) as usize;
                vec![seed.wrapping_add(level as u8); len]
            })
            .collect();
        TextureData::from_packed_mips(format, size, mips).unwrap()
    };
    let paths = [
        write_dds(dir.path(), "grass0.dds", &make(10)),
        write_dds(dir.path(), "grass1.dds", &make(20)),
    ];

    let device = HeadlessDevice::new();
    let context = HeadlessContext::new();
    let array = build_texture_array(Some(&device), Some(&context), &paths, 0)
        .unwrap()
        .unwrap();

    assert_eq!(array.desc().format, ImageFormat::Bc1Unorm);
    assert_eq!(array.desc().mip_levels, 4);
    // 1x1 BC1 mip still occupies one 8-byte block
    let smallest = array
        .texture()
        .read_subresource(calc_subresource(3, 1, 4))
        .unwrap();
    assert_eq!(smallest, vec![23; 8]);
}

#[test]
fn invalid_updates_are_counted() {
    init();
    let device = HeadlessDevice::new();
    let context = HeadlessContext::new();
    let texture = device
        .create_texture_array(&TextureArrayDesc {
            size: Size::new(4, 4),
            mip_levels: 1,
            array_size: 2,
            format: ImageFormat::R8G8B8A8Unorm,
        })
        .unwrap();

    let full = HeadlessMapping {
        bytes: vec![0xab; 64],
        row_pitch: 16,
        depth_pitch: 64,
    };
    let short = HeadlessMapping {
        bytes: vec![0xcd; 40],
        ..full.clone()
    };

    context.update_subresource(&texture, 2, &full);
    context.update_subresource(&texture, 1, &short);
    assert_eq!(context.rejected_updates(), 2);
    assert_eq!(context.updates(), 0);
    assert_eq!(texture.read_subresource(1).unwrap(), vec![0; 64]);

    context.update_subresource(&texture, 1, &full);
    assert_eq!(context.rejected_updates(), 2);
    assert_eq!(context.updates(), 1);
    assert_eq!(texture.read_subresource(1).unwrap(), vec![0xab; 64]);
}
