use anyhow::Result;
use std::path::Path;

#[derive(Debug, Clone)]
pub struct Segment {
    pub name: String,
    pub base: usize,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct Image {
    pub segments: Vec<Segment>,
}

pub fn load_raw_bin(path: &Path, base: usize, skip: usize, len: Option<usize>) -> Result<Image> {
    let file = std::fs::read(path)?;
    anyhow::ensure!(skip <= file.len(), "--skip exceeds file size");
    let mut payload = &file[skip..];
    if let Some(lim) = len {
        anyhow::ensure!(lim <= payload.len(), "--len exceeds remaining file size after skip");
        payload = &payload[..lim];
    }
    anyhow::ensure!(
        base.checked_add(payload.len()).is_some(),
        "--base {base:#x} plus image length overflows the address space"
    );
    let seg = Segment { name: "segment0".into(), base, bytes: payload.to_vec() };
    Ok(Image { segments: vec![seg] })
}

pub fn read_u8(img: &Image, addr: usize) -> Option<u8> {
    for s in &img.segments {
        if let Some(off) = addr.checked_sub(s.base) {
            if let Some(&b) = s.bytes.get(off) {
                return Some(b);
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loader_maps_skip_and_len() {
        let path = std::env::temp_dir().join("_tinycpu_test_bin.bin");
        std::fs::write(&path, [0u8, 1, 2, 3, 4, 5]).unwrap();
        let img = load_raw_bin(&path, 0x10, 2, Some(3)).unwrap();
        assert_eq!(img.segments.len(), 1);
        let s = &img.segments[0];
        assert_eq!(s.base, 0x10);
        assert_eq!(s.bytes, vec![2, 3, 4]);
        assert_eq!(read_u8(&img, 0x12), Some(4));
        assert!(read_u8(&img, 0x13).is_none());
        assert!(read_u8(&img, 0x0f).is_none());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn loader_rejects_oversized_skip() {
        let path = std::env::temp_dir().join("_tinycpu_test_skip.bin");
        std::fs::write(&path, [0u8, 1]).unwrap();
        assert!(load_raw_bin(&path, 0, 3, None).is_err());
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn loader_rejects_base_past_address_space() {
        let path = std::env::temp_dir().join("_tinycpu_test_base.bin");
        std::fs::write(&path, [0u8, 1, 2]).unwrap();
        assert!(load_raw_bin(&path, usize::MAX - 1, 0, None).is_err());
        let img = load_raw_bin(&path, usize::MAX - 3, 0, None).unwrap();
        assert_eq!(read_u8(&img, usize::MAX - 1), Some(2));
        assert!(read_u8(&img, usize::MAX).is_none());
        let _ = std::fs::remove_file(&path);
    }
}
