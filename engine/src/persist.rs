use crate::catalog::Catalog;
use crate::error::LoadError;
use crate::index::{SimilarityIndex, SparseVector};
use crate::vectorizer::Vectorizer;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

pub const ARTIFACT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_recipes: usize,
    pub created_at: String,
    pub version: u32,
}

impl MetaFile {
    pub fn now(num_recipes: usize) -> Self {
        let created_at = time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default();
        Self { num_recipes, created_at, version: ARTIFACT_VERSION }
    }
}

/// File layout of an artifact directory.
pub struct ArtifactPaths {
    pub root: PathBuf,
}

impl ArtifactPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn catalog(&self) -> PathBuf { self.root.join("recipes.csv") }
    pub fn vectorizer(&self) -> PathBuf { self.root.join("vectorizer.bin") }
    pub fn matrix(&self) -> PathBuf { self.root.join("matrix.bin") }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, LoadError> {
    let mut f = File::open(path).map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf).map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;
    Ok(buf)
}

fn decode<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let buf = read_bytes(path)?;
    bincode::deserialize(&buf).map_err(|source| LoadError::Decode { path: path.to_path_buf(), source })
}

pub fn save_catalog(paths: &ArtifactPaths, catalog: &Catalog) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut extra_headers: Vec<&str> = catalog
        .iter()
        .flat_map(|r| r.extra.keys().map(String::as_str))
        .collect();
    extra_headers.sort_unstable();
    extra_headers.dedup();

    let mut w = csv::Writer::from_path(paths.catalog())?;
    let mut header = vec!["name", "total_time", "difficulty", "rating", "steps"];
    header.extend(extra_headers.iter().copied());
    w.write_record(&header)?;
    for r in catalog {
        let num = |v: Option<f64>| v.map(|n| n.to_string()).unwrap_or_default();
        let mut record = vec![
            r.name.clone(),
            num(r.total_time),
            r.difficulty.clone().unwrap_or_default(),
            num(r.rating),
            r.steps.clone().unwrap_or_default(),
        ];
        record.extend(extra_headers.iter().map(|h| r.extra.get(*h).cloned().unwrap_or_default()));
        w.write_record(&record)?;
    }
    w.flush()?;
    Ok(())
}

pub fn load_catalog(paths: &ArtifactPaths) -> Result<Catalog, LoadError> {
    Catalog::from_csv_path(paths.catalog())
}

pub fn save_vectorizer(paths: &ArtifactPaths, vectorizer: &Vectorizer) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.vectorizer())?;
    let bytes = bincode::serialize(vectorizer)?;
    f.write_all(&bytes)?;
    Ok(())
}

pub fn load_vectorizer(paths: &ArtifactPaths) -> Result<Vectorizer, LoadError> {
    let vectorizer: Vectorizer = decode(&paths.vectorizer())?;
    vectorizer.validate()?;
    Ok(vectorizer)
}

pub fn save_matrix(paths: &ArtifactPaths, rows: &[SparseVector]) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.matrix())?;
    let bytes = bincode::serialize(rows)?;
    f.write_all(&bytes)?;
    Ok(())
}

pub fn load_matrix(paths: &ArtifactPaths) -> Result<Vec<SparseVector>, LoadError> {
    decode(&paths.matrix())
}

pub fn save_meta(paths: &ArtifactPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &ArtifactPaths) -> Result<MetaFile, LoadError> {
    let path = paths.meta();
    let buf = read_bytes(&path)?;
    serde_json::from_slice(&buf).map_err(|source| LoadError::Meta { path, source })
}

/// Write a complete artifact directory for a catalog and its index.
pub fn save_artifacts(paths: &ArtifactPaths, catalog: &Catalog, index: &SimilarityIndex) -> Result<()> {
    save_catalog(paths, catalog)?;
    save_vectorizer(paths, index.vectorizer())?;
    save_matrix(paths, index.rows())?;
    save_meta(paths, &MetaFile::now(catalog.len()))?;
    Ok(())
}

/// Load everything needed to serve: catalog, vectorizer and matrix, checked for row alignment.
pub fn load_artifacts(paths: &ArtifactPaths) -> Result<(Catalog, SimilarityIndex), LoadError> {
    let meta = load_meta(paths)?;
    if meta.version != ARTIFACT_VERSION {
        return Err(LoadError::Version { found: meta.version, expected: ARTIFACT_VERSION });
    }
    let catalog = load_catalog(paths)?;
    let rows = load_matrix(paths)?;
    if catalog.len() != rows.len() {
        return Err(LoadError::Misaligned { catalog: catalog.len(), index: rows.len() });
    }
    if meta.num_recipes != catalog.len() {
        return Err(LoadError::MetaMismatch { meta: meta.num_recipes, catalog: catalog.len() });
    }
    let index = SimilarityIndex::new(load_vectorizer(paths)?, rows)?;
    tracing::info!(
        recipes = catalog.len(),
        terms = index.vectorizer().vocabulary_len(),
        created_at = %meta.created_at,
        "loaded artifacts"
    );
    Ok((catalog, index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Recipe;
    use crate::vectorizer::Weighting;
    use std::collections::BTreeMap;
    use tempfile::tempdir;

    fn recipe(name: &str, time: Option<f64>, extra: &[(&str, &str)]) -> Recipe {
        Recipe {
            id: 0,
            name: name.into(),
            total_time: time,
            difficulty: Some("easy".into()),
            rating: None,
            steps: Some("Mix|Bake".into()),
            extra: extra.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect::<BTreeMap<_, _>>(),
        }
    }

    fn fixture() -> (Catalog, SimilarityIndex) {
        let catalog = Catalog::from_recipes(vec![
            recipe("Pancakes", Some(20.0), &[("ingredients", "flour egg milk")]),
            recipe("Omelette", None, &[("ingredients", "egg cheese")]),
        ]);
        let index = SimilarityIndex::fit(&["flour egg milk", "egg cheese"], Weighting::default());
        (catalog, index)
    }

    #[test]
    fn artifacts_survive_a_save_and_load() {
        let dir = tempdir().unwrap();
        let paths = ArtifactPaths::new(dir.path());
        let (catalog, index) = fixture();
        save_artifacts(&paths, &catalog, &index).unwrap();

        let (loaded_catalog, loaded_index) = load_artifacts(&paths).unwrap();
        assert_eq!(loaded_catalog.recipes(), catalog.recipes());
        assert_eq!(loaded_index.rows(), index.rows());
        assert_eq!(loaded_index.vectorizer().transform("egg"), index.vectorizer().transform("egg"));
    }

    #[test]
    fn missing_matrix_is_a_load_error() {
        let dir = tempdir().unwrap();
        let paths = ArtifactPaths::new(dir.path());
        let (catalog, index) = fixture();
        save_artifacts(&paths, &catalog, &index).unwrap();
        std::fs::remove_file(paths.matrix()).unwrap();
        assert!(matches!(load_artifacts(&paths), Err(LoadError::Io { .. })));
    }

    #[test]
    fn row_count_mismatch_is_rejected() {
        let dir = tempdir().unwrap();
        let paths = ArtifactPaths::new(dir.path());
        let (catalog, index) = fixture();
        save_artifacts(&paths, &catalog, &index).unwrap();
        save_matrix(&paths, &index.rows()[..1]).unwrap();
        assert!(matches!(
            load_artifacts(&paths),
            Err(LoadError::Misaligned { catalog: 2, index: 1 })
        ));
    }

    #[test]
    fn stale_meta_count_is_reported_as_such() {
        let dir = tempdir().unwrap();
        let paths = ArtifactPaths::new(dir.path());
        let (catalog, index) = fixture();
        save_artifacts(&paths, &catalog, &index).unwrap();
        save_meta(&paths, &MetaFile::now(5)).unwrap();
        let err = load_artifacts(&paths).unwrap_err();
        assert!(matches!(err, LoadError::MetaMismatch { meta: 5, catalog: 2 }));
        assert!(err.to_string().contains("meta.json records 5"));
    }

    #[test]
    fn out_of_vocabulary_matrix_row_is_corrupt() {
        let dir = tempdir().unwrap();
        let paths = ArtifactPaths::new(dir.path());
        let (catalog, index) = fixture();
        save_artifacts(&paths, &catalog, &index).unwrap();
        let mut rows = index.rows().to_vec();
        rows[1] = SparseVector { indices: vec![999], values: vec![1.0] };
        save_matrix(&paths, &rows).unwrap();
        assert!(matches!(load_artifacts(&paths), Err(LoadError::Corrupt(_))));
    }

    #[test]
    fn garbage_vectorizer_is_a_decode_error() {
        let dir = tempdir().unwrap();
        let paths = ArtifactPaths::new(dir.path());
        let (catalog, index) = fixture();
        save_artifacts(&paths, &catalog, &index).unwrap();
        std::fs::write(paths.vectorizer(), b"\xff\xff\xff\xff\xff\xff\xff\xff\xff").unwrap();
        assert!(matches!(load_artifacts(&paths), Err(LoadError::Decode { .. })));
    }
}
