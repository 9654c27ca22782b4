//! Binary DNA codec.
//!
//! ```text
//! "DNA"  u16 generation  u16 version
//! descriptor   name:str  translation_unit:u8  rotation_unit:u8  lod_count:u16
//! definition   joint_names:[str]  joint_parents:[u16]
//!              neutral_joint_translations:vec3s  neutral_joint_rotations:vec3s
//!              blend_shape_channel_names:[str]  mesh_names:[str]
//!              lod_mesh_indices:[[u16]]  lod_blend_shape_channel_indices:[[u16]]
//! geometry     meshes:[ positions:vec3s  targets:[ channel:u16  indices:[u32]  deltas:vec3s ] ]
//! "AND"
//! ```
//!
//! All integers and floats are little endian. `[T]` is a `u32` count followed by the
//! elements, `str` is a `u32` byte length followed by UTF-8, and `vec3s` is a `u32` row count
//! followed by all X, then all Y, then all Z components as `f32`.

use crate::dna::document::{
    BlendShapeTarget, Definition, Descriptor, DnaDocument, Geometry, Mesh, Vector3Array,
};
use crate::dna::stream::DnaCodec;
use crate::foundation::core::{RotationUnit, TranslationUnit};
use crate::foundation::error::{CalibError, CalibResult};

const SIGNATURE: &[u8; 3] = b"DNA";
const EOF_SIGNATURE: &[u8; 3] = b"AND";

/// Binary layout generation 2, version 1.
#[derive(Clone, Copy, Debug, Default)]
pub struct BinaryCodec;

impl BinaryCodec {
    pub const GENERATION: u16 = 2;
    pub const VERSION: u16 = 1;
}

impl DnaCodec for BinaryCodec {
    fn decode(&self, bytes: &[u8]) -> CalibResult<DnaDocument> {
        let mut r = ByteReader::new(bytes);
        r.expect_signature(SIGNATURE, "signature")?;
        let generation = r.u16()?;
        let version = r.u16()?;
        if generation != Self::GENERATION || version != Self::VERSION {
            return Err(CalibError::format(format!(
                "unsupported DNA layout generation {generation} version {version} (expected {}.{})",
                Self::GENERATION,
                Self::VERSION
            )));
        }

        let descriptor = Descriptor {
            name: r.string()?,
            translation_unit: TranslationUnit::from_u8(r.u8()?)?,
            rotation_unit: RotationUnit::from_u8(r.u8()?)?,
            lod_count: r.u16()?,
        };

        let definition = Definition {
            joint_names: r.strings()?,
            joint_parents: r.u16s()?,
            neutral_joint_translations: r.vec3s()?,
            neutral_joint_rotations: r.vec3s()?,
            blend_shape_channel_names: r.strings()?,
            mesh_names: r.strings()?,
            lod_mesh_indices: r.nested_u16s()?,
            lod_blend_shape_channel_indices: r.nested_u16s()?,
        };

        let mesh_count = r.count()?;
        let mut meshes = Vec::with_capacity(mesh_count.min(r.remaining()));
        for _ in 0..mesh_count {
            let positions = r.vec3s()?;
            let target_count = r.count()?;
            let mut blend_shape_targets = Vec::with_capacity(target_count.min(r.remaining()));
            for _ in 0..target_count {
                blend_shape_targets.push(BlendShapeTarget {
                    channel_index: r.u16()?,
                    vertex_indices: r.u32s()?,
                    deltas: r.vec3s()?,
                });
            }
            meshes.push(Mesh {
                positions,
                blend_shape_targets,
            });
        }

        r.expect_signature(EOF_SIGNATURE, "end-of-file signature")?;
        if r.remaining() != 0 {
            return Err(CalibError::format(format!(
                "{} trailing bytes after end-of-file signature",
                r.remaining()
            )));
        }

        Ok(DnaDocument {
            descriptor,
            definition,
            geometry: Geometry { meshes },
        })
    }

    fn encode(&self, doc: &DnaDocument) -> CalibResult<Vec<u8>> {
        let mut w = ByteWriter::default();
        w.bytes(SIGNATURE);
        w.u16(Self::GENERATION);
        w.u16(Self::VERSION);

        let d = &doc.descriptor;
        w.string(&d.name)?;
        w.u8(d.translation_unit.to_u8());
        w.u8(d.rotation_unit.to_u8());
        w.u16(d.lod_count);

        let def = &doc.definition;
        w.strings(&def.joint_names)?;
        w.u16s(&def.joint_parents)?;
        w.vec3s(&def.neutral_joint_translations)?;
        w.vec3s(&def.neutral_joint_rotations)?;
        w.strings(&def.blend_shape_channel_names)?;
        w.strings(&def.mesh_names)?;
        w.nested_u16s(&def.lod_mesh_indices)?;
        w.nested_u16s(&def.lod_blend_shape_channel_indices)?;

        w.count(doc.geometry.meshes.len())?;
        for mesh in &doc.geometry.meshes {
            w.vec3s(&mesh.positions)?;
            w.count(mesh.blend_shape_targets.len())?;
            for t in &mesh.blend_shape_targets {
                w.u16(t.channel_index);
                w.u32s(&t.vertex_indices)?;
                w.vec3s(&t.deltas)?;
            }
        }

        w.bytes(EOF_SIGNATURE);
        Ok(w.buf)
    }
}

struct ByteReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize) -> CalibResult<&'a [u8]> {
        if self.remaining() < n {
            return Err(CalibError::format(format!(
                "unexpected end of data at byte {} (need {n}, have {})",
                self.pos,
                self.remaining()
            )));
        }
        let buf: &'a [u8] = self.buf;
        let out = &buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    fn array<const N: usize>(&mut self) -> CalibResult<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    fn expect_signature(&mut self, sig: &[u8; 3], what: &str) -> CalibResult<()> {
        let at = self.pos;
        if self.take(3)? != sig {
            return Err(CalibError::format(format!("bad {what} at byte {at}")));
        }
        Ok(())
    }

    fn u8(&mut self) -> CalibResult<u8> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> CalibResult<u16> {
        Ok(u16::from_le_bytes(self.array()?))
    }

    fn u32(&mut self) -> CalibResult<u32> {
        Ok(u32::from_le_bytes(self.array()?))
    }

    fn f32(&mut self) -> CalibResult<f32> {
        Ok(f32::from_le_bytes(self.array()?))
    }

    fn count(&mut self) -> CalibResult<usize> {
        Ok(self.u32()? as usize)
    }

    fn string(&mut self) -> CalibResult<String> {
        let n = self.count()?;
        let at = self.pos;
        let raw = self.take(n)?;
        String::from_utf8(raw.to_vec())
            .map_err(|e| CalibError::format(format!("invalid UTF-8 string at byte {at}: {e}")))
    }

    fn strings(&mut self) -> CalibResult<Vec<String>> {
        let n = self.count()?;
        let mut out = Vec::with_capacity(n.min(self.remaining()));
        for _ in 0..n {
            out.push(self.string()?);
        }
        Ok(out)
    }

    fn u16s(&mut self) -> CalibResult<Vec<u16>> {
        let n = self.count()?;
        let mut out = Vec::with_capacity(n.min(self.remaining() / 2));
        for _ in 0..n {
            out.push(self.u16()?);
        }
        Ok(out)
    }

    fn u32s(&mut self) -> CalibResult<Vec<u32>> {
        let n = self.count()?;
        let mut out = Vec::with_capacity(n.min(self.remaining() / 4));
        for _ in 0..n {
            out.push(self.u32()?);
        }
        Ok(out)
    }

    fn f32s(&mut self, n: usize) -> CalibResult<Vec<f32>> {
        let mut out = Vec::with_capacity(n.min(self.remaining() / 4));
        for _ in 0..n {
            out.push(self.f32()?);
        }
        Ok(out)
    }

    fn vec3s(&mut self) -> CalibResult<Vector3Array> {
        let n = self.count()?;
        Ok(Vector3Array {
            xs: self.f32s(n)?,
            ys: self.f32s(n)?,
            zs: self.f32s(n)?,
        })
    }

    fn nested_u16s(&mut self) -> CalibResult<Vec<Vec<u16>>> {
        let n = self.count()?;
        let mut out = Vec::with_capacity(n.min(self.remaining()));
        for _ in 0..n {
            out.push(self.u16s()?);
        }
        Ok(out)
    }
}

#[derive(Default)]
struct ByteWriter {
    buf: Vec<u8>,
}

impl ByteWriter {
    fn bytes(&mut self, b: &[u8]) {
        self.buf.extend_from_slice(b);
    }

    fn u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    fn u16(&mut self, v: u16) {
        self.bytes(&v.to_le_bytes());
    }

    fn u32(&mut self, v: u32) {
        self.bytes(&v.to_le_bytes());
    }

    fn count(&mut self, n: usize) -> CalibResult<()> {
        let n = u32::try_from(n)
            .map_err(|_| CalibError::format(format!("array length {n} exceeds u32 range")))?;
        self.u32(n);
        Ok(())
    }

    fn string(&mut self, s: &str) -> CalibResult<()> {
        self.count(s.len())?;
        self.bytes(s.as_bytes());
        Ok(())
    }

    fn strings(&mut self, v: &[String]) -> CalibResult<()> {
        self.count(v.len())?;
        for s in v {
            self.string(s)?;
        }
        Ok(())
    }

    fn u16s(&mut self, v: &[u16]) -> CalibResult<()> {
        self.count(v.len())?;
        for &x in v {
            self.u16(x);
        }
        Ok(())
    }

    fn u32s(&mut self, v: &[u32]) -> CalibResult<()> {
        self.count(v.len())?;
        for &x in v {
            self.u32(x);
        }
        Ok(())
    }

    fn vec3s(&mut self, v: &Vector3Array) -> CalibResult<()> {
        if !v.is_parallel() {
            return Err(CalibError::format(
                "cannot encode non-parallel component arrays",
            ));
        }
        self.count(v.len())?;
        for comp in [&v.xs, &v.ys, &v.zs] {
            for &x in comp.iter() {
                self.bytes(&x.to_le_bytes());
            }
        }
        Ok(())
    }

    fn nested_u16s(&mut self, v: &[Vec<u16>]) -> CalibResult<()> {
        self.count(v.len())?;
        for inner in v {
            self.u16s(inner)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/dna/binary.rs"]
mod tests;
