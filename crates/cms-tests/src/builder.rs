//! Synthetic ICC profile builder
//!
//! Writes just enough of an ICC profile for the parser: a 128-byte header,
//! the tag table and 4-byte aligned tag payloads.

/// D50 PCS illuminant, s15.16
const D50_ILLUMINANT: [i32; 3] = [0x0000_f6d6, 0x0001_0000, 0x0000_d32d];

/// sRGB colorants adapted to D50, one column per channel
pub const SRGB_COLORANTS: [[f32; 3]; 3] = [
    [0.436_065_674, 0.222_488_403, 0.013_916_016],
    [0.385_147_095, 0.716_873_169, 0.097_076_416],
    [0.143_066_406, 0.060_607_910, 0.714_096_069],
];

/// Display P3 colorants adapted to D50, one column per channel
pub const P3_COLORANTS: [[f32; 3]; 3] = [
    [0.515_102, 0.241_196, -0.001_053],
    [0.291_965, 0.692_236, 0.041_882],
    [0.157_153, 0.066_561, 0.784_073],
];

fn s15fixed16(v: f32) -> [u8; 4] {
    ((v as f64 * 65536.0).round() as i32).to_be_bytes()
}

/// `curv` with a single u8.8 gamma
pub fn curv_gamma(g: f32) -> Vec<u8> {
    let mut tag = b"curv\0\0\0\0".to_vec();
    tag.extend_from_slice(&1u32.to_be_bytes());
    tag.extend_from_slice(&((g * 256.0).round() as u16).to_be_bytes());
    tag
}

/// `curv` with no entries (identity)
pub fn curv_identity() -> Vec<u8> {
    let mut tag = b"curv\0\0\0\0".to_vec();
    tag.extend_from_slice(&0u32.to_be_bytes());
    tag
}

/// `curv` table
pub fn curv_table(entries: &[u16]) -> Vec<u8> {
    let mut tag = b"curv\0\0\0\0".to_vec();
    tag.extend_from_slice(&(entries.len() as u32).to_be_bytes());
    for e in entries {
        tag.extend_from_slice(&e.to_be_bytes());
    }
    tag
}

/// A `size`-entry table sampling `f` on [0, 1]
pub fn sampled_table(size: usize, f: impl Fn(f64) -> f64) -> Vec<u16> {
    (0..size)
        .map(|i| {
            let x = i as f64 / (size - 1) as f64;
            (f(x).clamp(0.0, 1.0) * 65535.0).round() as u16
        })
        .collect()
}

/// `para` of the given function type (0..=4) and its parameters, `g` first
pub fn para(function_type: u16, params: &[f32]) -> Vec<u8> {
    let mut tag = b"para\0\0\0\0".to_vec();
    tag.extend_from_slice(&function_type.to_be_bytes());
    tag.extend_from_slice(&[0, 0]);
    for &p in params {
        tag.extend_from_slice(&s15fixed16(p));
    }
    tag
}

/// `XYZ ` with one value
pub fn xyz(v: [f32; 3]) -> Vec<u8> {
    let mut tag = b"XYZ \0\0\0\0".to_vec();
    for c in v {
        tag.extend_from_slice(&s15fixed16(c));
    }
    tag
}

/// `cicp` with the four code points
pub fn cicp(primaries: u8, transfer: u8, matrix: u8, full_range: u8) -> Vec<u8> {
    let mut tag = b"cicp\0\0\0\0".to_vec();
    tag.extend_from_slice(&[primaries, transfer, matrix, full_range]);
    tag
}

/// `mft2` with identity input/output curves and a grid of `grid` points per
/// axis filled by `f` (normalized inputs → normalized outputs)
///
/// The first input varies slowest.
pub fn mft2(inputs: u8, outputs: u8, grid: u8, f: impl Fn(&[f64]) -> Vec<f64>) -> Vec<u8> {
    let mut tag = b"mft2\0\0\0\0".to_vec();
    tag.extend_from_slice(&[inputs, outputs, grid, 0]);
    for v in [1.0f32, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0] {
        tag.extend_from_slice(&s15fixed16(v));
    }
    tag.extend_from_slice(&2u16.to_be_bytes());
    tag.extend_from_slice(&2u16.to_be_bytes());

    let identity = [0u16, 0xffff];
    for _ in 0..inputs {
        for e in identity {
            tag.extend_from_slice(&e.to_be_bytes());
        }
    }

    let cells = (grid as usize).pow(inputs as u32);
    let mut coords = vec![0f64; inputs as usize];
    for cell in 0..cells {
        let mut rem = cell;
        for axis in (0..inputs as usize).rev() {
            coords[axis] = (rem % grid as usize) as f64 / (grid - 1) as f64;
            rem /= grid as usize;
        }
        let out = f(&coords);
        for &v in out.iter().take(outputs as usize) {
            tag.extend_from_slice(&((v.clamp(0.0, 1.0) * 65535.0).round() as u16).to_be_bytes());
        }
    }

    for _ in 0..outputs {
        for e in identity {
            tag.extend_from_slice(&e.to_be_bytes());
        }
    }
    tag
}

/// `mAB`/`mBA` tag with identity B curves, an optional 8-bit CLUT and
/// optional identity A curves
#[derive(Debug, Clone)]
pub struct LutAb {
    signature: [u8; 4],
    inputs: u8,
    outputs: u8,
    clut: Option<(Vec<u8>, Vec<u8>)>,
    a_curves: Option<usize>,
}

impl LutAb {
    /// Device → PCS with `inputs` device channels
    pub fn mab(inputs: u8) -> Self {
        Self::new(*b"mAB ", inputs, 3)
    }

    /// PCS → device with `outputs` device channels
    pub fn mba(outputs: u8) -> Self {
        Self::new(*b"mBA ", 3, outputs)
    }

    fn new(signature: [u8; 4], inputs: u8, outputs: u8) -> Self {
        Self {
            signature,
            inputs,
            outputs,
            clut: None,
            a_curves: None,
        }
    }

    /// Write `count` identity A curves
    pub fn a_curves(mut self, count: usize) -> Self {
        self.a_curves = Some(count);
        self
    }

    /// 8-bit CLUT with `grid_points` per input axis, filled by `f`
    /// (normalized inputs → normalized outputs). The last input varies fastest.
    pub fn clut(mut self, grid_points: &[u8], f: impl Fn(&[f64]) -> Vec<f64>) -> Self {
        let outputs = self.outputs as usize;
        let cells: usize = grid_points.iter().map(|&g| g as usize).product();
        let mut coords = vec![0f64; grid_points.len()];
        let mut samples = Vec::with_capacity(cells * outputs);
        for cell in 0..cells {
            let mut rem = cell;
            for (axis, &g) in grid_points.iter().enumerate().rev() {
                coords[axis] = (rem % g as usize) as f64 / (g - 1) as f64;
                rem /= g as usize;
            }
            let out = f(&coords);
            samples.extend(out.iter().take(outputs).map(|v| (v.clamp(0.0, 1.0) * 255.0).round() as u8));
        }
        self.clut = Some((grid_points.to_vec(), samples));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut tag = self.signature.to_vec();
        tag.extend_from_slice(&[0, 0, 0, 0, self.inputs, self.outputs, 0, 0]);
        tag.resize(32, 0);
        tag[12..16].copy_from_slice(&32u32.to_be_bytes());
        for _ in 0..3 {
            tag.extend_from_slice(&curv_identity());
        }
        if let Some((grid_points, samples)) = &self.clut {
            set_offset(&mut tag, 24);
            let mut header = [0u8; 20];
            header[..grid_points.len()].copy_from_slice(grid_points);
            header[16] = 1;
            tag.extend_from_slice(&header);
            tag.extend_from_slice(samples);
        }
        if let Some(count) = self.a_curves {
            set_offset(&mut tag, 28);
            for _ in 0..count {
                tag.extend_from_slice(&curv_identity());
            }
        }
        tag
    }
}

/// Pad `tag` to 4 bytes and point the header field at `field` to its end
fn set_offset(tag: &mut Vec<u8>, field: usize) {
    while tag.len() % 4 != 0 {
        tag.push(0);
    }
    let offset = tag.len() as u32;
    tag[field..field + 4].copy_from_slice(&offset.to_be_bytes());
}

/// Builds ICC profile bytes
#[derive(Debug, Clone)]
pub struct ProfileBuilder {
    color_space: [u8; 4],
    pcs: [u8; 4],
    version: u8,
    tags: Vec<([u8; 4], Vec<u8>)>,
}

impl ProfileBuilder {
    pub fn new(color_space: &[u8; 4]) -> Self {
        Self {
            color_space: *color_space,
            pcs: *b"XYZ ",
            version: 4,
            tags: Vec::new(),
        }
    }

    /// RGB profile with the given colorant columns and one TRC for all channels
    pub fn matrix_trc(colorants: [[f32; 3]; 3], trc: Vec<u8>) -> Self {
        Self::new(b"RGB ")
            .tag(b"rXYZ", xyz(colorants[0]))
            .tag(b"gXYZ", xyz(colorants[1]))
            .tag(b"bXYZ", xyz(colorants[2]))
            .tag(b"rTRC", trc.clone())
            .tag(b"gTRC", trc.clone())
            .tag(b"bTRC", trc)
    }

    /// sRGB primaries with the parametric sRGB curve
    pub fn srgb() -> Self {
        Self::matrix_trc(
            SRGB_COLORANTS,
            para(3, &[2.4, 1.0 / 1.055, 0.055 / 1.055, 1.0 / 12.92, 0.04045]),
        )
    }

    pub fn pcs(mut self, pcs: &[u8; 4]) -> Self {
        self.pcs = *pcs;
        self
    }

    pub fn version(mut self, major: u8) -> Self {
        self.version = major;
        self
    }

    pub fn tag(mut self, signature: &[u8; 4], data: Vec<u8>) -> Self {
        self.tags.push((*signature, data));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let table_end = 132 + 12 * self.tags.len();
        let mut out = vec![0u8; table_end];
        let mut entries = Vec::with_capacity(self.tags.len());
        for (signature, data) in &self.tags {
            while out.len() % 4 != 0 {
                out.push(0);
            }
            entries.push((*signature, out.len() as u32, data.len() as u32));
            out.extend_from_slice(data);
        }

        let size = out.len() as u32;
        out[0..4].copy_from_slice(&size.to_be_bytes());
        out[8] = self.version;
        out[12..16].copy_from_slice(b"mntr");
        out[16..20].copy_from_slice(&self.color_space);
        out[20..24].copy_from_slice(&self.pcs);
        out[36..40].copy_from_slice(b"acsp");
        for (i, v) in D50_ILLUMINANT.iter().enumerate() {
            out[68 + 4 * i..72 + 4 * i].copy_from_slice(&v.to_be_bytes());
        }
        out[128..132].copy_from_slice(&(self.tags.len() as u32).to_be_bytes());
        for (i, (signature, offset, len)) in entries.iter().enumerate() {
            let at = 132 + 12 * i;
            out[at..at + 4].copy_from_slice(signature);
            out[at + 4..at + 8].copy_from_slice(&offset.to_be_bytes());
            out[at + 8..at + 12].copy_from_slice(&len.to_be_bytes());
        }
        out
    }
}
