//! File classification: one file in, at most one node out.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::package::find_embedded_video;
use super::questions::parse_questions;
use super::settings::InvalidQuestionPolicy;
use super::title::normalize_title;
use super::{BuildError, ChannelBuilder};
use crate::domain::{
    ContentNode, ExerciseNode, FilePreset, NodeFile, NodeMeta, Question, ResourceNode,
};

/// Recognised content files
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// `.pdf`
    Document,
    /// `.h5p`
    Package,
    /// `.xls`
    Exercise,
}

impl FileKind {
    /// Kind by extension (case-insensitive); `None` means skip the file
    pub fn from_filename(filename: &str) -> Option<Self> {
        let ext = Path::new(filename).extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "pdf" => Some(FileKind::Document),
            "h5p" => Some(FileKind::Package),
            "xls" => Some(FileKind::Exercise),
            _ => None,
        }
    }
}

/// Apply the invalid-question policy to a parsed quiz
pub fn check_questions(
    path: &Path,
    questions: &[Question],
    policy: InvalidQuestionPolicy,
) -> Result<(), BuildError> {
    for question in questions {
        if let Err(defect) = question.validate() {
            match policy {
                InvalidQuestionPolicy::Reject => {
                    return Err(BuildError::InvalidQuestion {
                        path: path.to_path_buf(),
                        id: question.id.clone(),
                        defect,
                    });
                }
                InvalidQuestionPolicy::Keep => {
                    warn!(
                        path = %path.display(),
                        id = %question.id,
                        %defect,
                        "Publishing invalid question"
                    );
                }
            }
        }
    }
    Ok(())
}

impl ChannelBuilder {
    /// Turn `directory/filename` into a node
    ///
    /// `title` overrides the default title (the unit name) of documents and
    /// packages. Files with an unknown extension yield `Ok(None)`.
    pub fn classify(
        &self,
        unit_name: &str,
        directory: &Path,
        filename: &str,
        title: Option<&str>,
    ) -> Result<Option<ContentNode>, BuildError> {
        let path = directory.join(filename);
        let source_id = format!("{}/{}", unit_name, filename);
        let title = title.unwrap_or(unit_name);

        let Some(kind) = FileKind::from_filename(filename) else {
            debug!(file = %path.display(), "Skipping unrecognised file");
            return Ok(None);
        };

        let node = match kind {
            FileKind::Document => {
                let meta = self.meta(source_id, title, format!("Documentación de {}", unit_name));
                let file = self.node_file(FilePreset::Document, path)?;
                ContentNode::Document(self.resource(meta, file))
            }
            FileKind::Package => {
                let description = format!("Vídeo explicativo de la {}", unit_name);
                let video = find_embedded_video(&path).map_err(|source| BuildError::Package {
                    path: path.clone(),
                    source,
                })?;

                match video {
                    Some(video) => {
                        let meta =
                            self.meta(source_id, normalize_title(filename, title), description);
                        let file = self.node_file(FilePreset::Video, video)?;
                        ContentNode::Video(self.resource(meta, file))
                    }
                    None => {
                        let meta = self.meta(source_id, title, description);
                        let file = self.node_file(FilePreset::H5p, path)?;
                        ContentNode::InteractivePackage(self.resource(meta, file))
                    }
                }
            }
            FileKind::Exercise => {
                let settings = self.settings();
                let questions =
                    parse_questions(&path, &settings.questions).map_err(|source| {
                        BuildError::Workbook {
                            path: path.clone(),
                            source,
                        }
                    })?;
                check_questions(&path, &questions, settings.questions.on_invalid)?;

                ContentNode::Exercise(ExerciseNode {
                    meta: self.meta(
                        source_id,
                        format!("Ejercicios de {}", unit_name),
                        format!("Preguntas de {}", unit_name),
                    ),
                    author: settings.author.clone(),
                    license: settings.license.clone(),
                    exercise_data: settings.exercise.clone(),
                    questions,
                })
            }
        };

        debug!(
            source_id = %node.source_id(),
            kind = %node.kind(),
            "Classified file"
        );
        Ok(Some(node))
    }

    fn meta(
        &self,
        source_id: String,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> NodeMeta {
        let settings = self.settings();
        NodeMeta::new(
            &settings.namespace,
            source_id,
            title,
            description,
            settings.language.as_str(),
        )
    }

    fn node_file(&self, preset: FilePreset, path: PathBuf) -> Result<NodeFile, BuildError> {
        NodeFile::from_path(preset, &path, &self.settings().language)
            .map_err(|source| BuildError::ReadFile { path, source })
    }

    fn resource(&self, meta: NodeMeta, file: NodeFile) -> ResourceNode {
        ResourceNode {
            meta,
            author: String::new(),
            license: self.settings().license.clone(),
            files: vec![file],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResolvedConfig;
    use crate::convert::settings::{QuestionSettings, SortOrder};
    use crate::domain::{ChannelInfo, License, NodeKind};
    use tempfile::TempDir;

    fn builder() -> ChannelBuilder {
        let config = ResolvedConfig {
            channel: ChannelInfo::default(),
            license: License::default(),
            base_path: PathBuf::from("."),
            sort_order: SortOrder::Ascending,
            author: "Equipo de AIEP".to_string(),
            questions: QuestionSettings::default(),
            config_file: None,
        };
        ChannelBuilder::from_config(&config)
    }

    #[test]
    fn test_file_kind() {
        assert_eq!(FileKind::from_filename("guia.pdf"), Some(FileKind::Document));
        assert_eq!(FileKind::from_filename("GUIA.PDF"), Some(FileKind::Document));
        assert_eq!(FileKind::from_filename("clase.h5p"), Some(FileKind::Package));
        assert_eq!(FileKind::from_filename("quiz.xls"), Some(FileKind::Exercise));
        assert_eq!(FileKind::from_filename("quiz.xlsx"), None);
        assert_eq!(FileKind::from_filename("notas.txt"), None);
        assert_eq!(FileKind::from_filename("pdf"), None);
    }

    #[test]
    fn test_document_node() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("guia.pdf"), b"%PDF-1.4").unwrap();

        let node = builder()
            .classify("Unidad 1", temp.path(), "guia.pdf", Some("guia"))
            .unwrap()
            .unwrap();

        assert_eq!(node.kind(), NodeKind::Document);
        assert_eq!(node.title(), "guia");
        assert_eq!(node.source_id(), "Unidad 1/guia.pdf");
        assert_eq!(node.meta().description, "Documentación de Unidad 1");
        assert_eq!(node.meta().language, "es");
        assert_eq!(node.files()[0].path, temp.path().join("guia.pdf"));
        assert_eq!(node.files()[0].preset, FilePreset::Document);
    }

    #[test]
    fn test_title_defaults_to_unit() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("guia.pdf"), b"%PDF-1.4").unwrap();

        let node = builder()
            .classify("Unidad 1", temp.path(), "guia.pdf", None)
            .unwrap()
            .unwrap();
        assert_eq!(node.title(), "Unidad 1");
    }

    #[test]
    fn test_unknown_extension_skipped() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("notas.txt"), b"hola").unwrap();

        let node = builder()
            .classify("Unidad 1", temp.path(), "notas.txt", None)
            .unwrap();
        assert!(node.is_none());
    }

    #[test]
    fn test_broken_package_is_fatal() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("roto.h5p"), b"garbage").unwrap();

        let result = builder().classify("Unidad 1", temp.path(), "roto.h5p", None);
        assert!(matches!(result, Err(BuildError::Package { .. })));
    }

    #[test]
    fn test_missing_workbook_is_fatal() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("quiz.xls"), b"not a workbook").unwrap();

        let result = builder().classify("Unidad 1", temp.path(), "quiz.xls", None);
        assert!(matches!(result, Err(BuildError::Workbook { .. })));
    }

    #[test]
    fn test_check_questions_policy() {
        let questions = vec![
            Question::new(0, "Q1", vec!["A".to_string()], "A"),
            Question::new(3, "Q2", vec![], ""),
        ];
        let path = Path::new("Unidad 1/quiz.xls");

        match check_questions(path, &questions, InvalidQuestionPolicy::Reject) {
            Err(BuildError::InvalidQuestion { id, .. }) => assert_eq!(id, "ejemplo_Q3"),
            other => panic!("expected InvalidQuestion, got {:?}", other),
        }

        assert!(check_questions(path, &questions, InvalidQuestionPolicy::Keep).is_ok());
    }
}
