use std::path::Path;
use std::sync::Arc;

use usvg::fontdb;

/// CSS-style weight of a regular face.
pub const REGULAR_WEIGHT: u16 = 400;
/// Weight requested for the artist line.
pub const BOLD_WEIGHT: u16 = 700;
/// A resolved bold face must report at least this weight to count as bold.
pub const CONFIRMED_BOLD_MIN: u16 = 600;

/// Tried when neither the requested family nor the generic sans-serif resolves.
const COMMON_SANS: &[&str] = &[
    "Helvetica Neue",
    "Arial",
    "Liberation Sans",
    "DejaVu Sans",
    "Noto Sans",
];

/// Font bytes plus the metadata used to tell faces apart.
#[derive(Debug)]
pub struct OutlineFace {
    pub family: String,
    pub post_script_name: String,
    pub weight: u16,
    pub index: u32,
    pub data: Arc<Vec<u8>>,
}

#[derive(Clone, Debug)]
pub enum FontFace {
    /// The 5×7 bitmap face in [`crate::text::builtin`].
    Builtin,
    Outline(Arc<OutlineFace>),
}

/// A face at a concrete pixel size.
#[derive(Clone, Debug)]
pub struct ResolvedFont {
    pub face: FontFace,
    pub size_px: f32,
    /// Weight is simulated with extra strokes because no distinct bold face was found.
    pub synthetic_bold: bool,
}

impl ResolvedFont {
    pub fn builtin(size_px: f32) -> Self {
        Self {
            face: FontFace::Builtin,
            size_px,
            synthetic_bold: false,
        }
    }

    /// Same face at another size.
    pub fn with_size(&self, size_px: f32) -> Self {
        Self {
            size_px,
            ..self.clone()
        }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self.face, FontFace::Builtin)
    }

    /// Face weight; the built-in face reports [`REGULAR_WEIGHT`].
    pub fn weight(&self) -> u16 {
        match &self.face {
            FontFace::Builtin => REGULAR_WEIGHT,
            FontFace::Outline(f) => f.weight,
        }
    }

    /// Compare faces by family, PostScript name, weight and collection index.
    pub fn same_face(&self, other: &ResolvedFont) -> bool {
        match (&self.face, &other.face) {
            (FontFace::Builtin, FontFace::Builtin) => true,
            (FontFace::Outline(a), FontFace::Outline(b)) => {
                a.family == b.family
                    && a.post_script_name == b.post_script_name
                    && a.weight == b.weight
                    && a.index == b.index
            }
            _ => false,
        }
    }
}

/// Resolves a family/weight/size request to a usable face. Never fails: implementations fall
/// back to the built-in face.
pub trait FontResolver: Send + Sync {
    fn resolve(&self, family: &str, weight: u16, size_px: f32) -> ResolvedFont;
}

/// Always answers with the built-in face.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinFontResolver;

impl FontResolver for BuiltinFontResolver {
    fn resolve(&self, _family: &str, _weight: u16, size_px: f32) -> ResolvedFont {
        ResolvedFont::builtin(size_px)
    }
}

/// Looks fonts up in a `fontdb` database: an optional project fonts directory first, then
/// the system fonts.
pub struct SystemFontResolver {
    db: fontdb::Database,
}

impl std::fmt::Debug for SystemFontResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemFontResolver")
            .field("faces", &self.db.len())
            .finish()
    }
}

impl SystemFontResolver {
    pub fn new(fonts_dir: Option<&Path>) -> Self {
        let mut db = fontdb::Database::new();
        if let Some(dir) = fonts_dir {
            load_fonts_from_dir(&mut db, dir);
        }
        db.load_system_fonts();
        tracing::debug!(faces = db.len(), "font database loaded");
        Self { db }
    }

    /// Use an already populated database.
    pub fn from_database(db: fontdb::Database) -> Self {
        Self { db }
    }

    fn lookup(&self, family: &str, weight: u16) -> Option<fontdb::ID> {
        let query = |families: &[fontdb::Family<'_>]| {
            self.db.query(&fontdb::Query {
                families,
                weight: fontdb::Weight(weight),
                stretch: fontdb::Stretch::Normal,
                style: fontdb::Style::Normal,
            })
        };
        if !family.trim().is_empty()
            && let Some(id) = query(&[fontdb::Family::Name(family.trim())])
        {
            return Some(id);
        }
        if let Some(id) = query(&[fontdb::Family::SansSerif]) {
            return Some(id);
        }
        COMMON_SANS
            .iter()
            .find_map(|name| query(&[fontdb::Family::Name(*name)]))
    }

    fn load_face(&self, id: fontdb::ID) -> Option<OutlineFace> {
        let info = self.db.face(id)?;
        let family = info
            .families
            .first()
            .map(|(name, _)| name.clone())
            .unwrap_or_default();
        let (data, index) = self
            .db
            .with_face_data(id, |data, index| (data.to_vec(), index))?;
        Some(OutlineFace {
            family,
            post_script_name: info.post_script_name.clone(),
            weight: info.weight.0,
            index,
            data: Arc::new(data),
        })
    }
}

impl FontResolver for SystemFontResolver {
    fn resolve(&self, family: &str, weight: u16, size_px: f32) -> ResolvedFont {
        let face = self.lookup(family, weight).and_then(|id| self.load_face(id));
        match face {
            Some(face) => {
                tracing::debug!(
                    requested = family,
                    resolved = %face.family,
                    weight = face.weight,
                    "font resolved"
                );
                ResolvedFont {
                    face: FontFace::Outline(Arc::new(face)),
                    size_px,
                    synthetic_bold: false,
                }
            }
            None => {
                tracing::warn!(requested = family, "no usable font found, using built-in face");
                ResolvedFont::builtin(size_px)
            }
        }
    }
}

fn load_fonts_from_dir(db: &mut fontdb::Database, dir: &Path) {
    let entries = match std::fs::read_dir(dir) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(dir = %dir.display(), error = %e, "fonts directory not readable");
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let is_font = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| matches!(e.to_ascii_lowercase().as_str(), "ttf" | "otf" | "ttc"))
            .unwrap_or(false);
        if is_font && let Err(e) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "failed to load font file");
        }
    }
}

/// Regular and bold faces for one family.
#[derive(Clone, Debug)]
pub struct FontPair {
    pub regular: ResolvedFont,
    pub bold: ResolvedFont,
}

/// Resolve both faces. The bold face is kept only if it reports a bold weight and is a
/// different face from the regular one; otherwise the regular face is reused with
/// `synthetic_bold` set.
pub fn resolve_pair(resolver: &dyn FontResolver, family: &str, size_px: f32) -> FontPair {
    let regular = resolver.resolve(family, REGULAR_WEIGHT, size_px);
    let bold = resolver.resolve(family, BOLD_WEIGHT, size_px);
    let confirmed = bold.weight() >= CONFIRMED_BOLD_MIN && !bold.same_face(&regular);
    let bold = if confirmed {
        bold
    } else {
        tracing::info!(family, "no distinct bold face, simulating bold weight");
        ResolvedFont {
            synthetic_bold: true,
            ..regular.clone()
        }
    };
    FontPair { regular, bold }
}

#[cfg(test)]
#[path = "../../tests/unit/text/fonts.rs"]
mod tests;
