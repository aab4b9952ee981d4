//! Directory walking: channel → courses → units → files.
//!
//! ```text
//! base/
//! └── <course>/            topic
//!     ├── <unit>/          one file  → the file's node, directly under the course
//!     │   └── guia.pdf
//!     └── <unit>/          several   → topic wrapping one node per file
//!         ├── clase.h5p
//!         └── quiz.xls
//! ```

use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use super::title::file_stem;
use super::{BuildError, ChannelBuilder};
use crate::domain::{Channel, ContentNode, NodeMeta, TopicNode};

/// Entry filter for directory listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entries {
    Dirs,
    Files,
}

/// Names of subdirectories or regular files, in enumeration order
fn list(path: &Path, which: Entries) -> Result<Vec<String>, BuildError> {
    let read_err = |source| BuildError::ReadDir {
        path: path.to_path_buf(),
        source,
    };

    let mut names = Vec::new();
    for entry in fs::read_dir(path).map_err(read_err)? {
        let entry = entry.map_err(read_err)?;
        let entry_path = entry.path();
        let keep = match which {
            Entries::Dirs => entry_path.is_dir(),
            Entries::Files => entry_path.is_file(),
        };
        if !keep {
            continue;
        }

        match entry.file_name().into_string() {
            Ok(name) => names.push(name),
            Err(raw) => warn!(name = ?raw, dir = %path.display(), "Skipping non UTF-8 name"),
        }
    }

    Ok(names)
}

impl ChannelBuilder {
    fn topic(&self, name: &str) -> TopicNode {
        let settings = self.settings();
        TopicNode::new(NodeMeta::new(
            &settings.namespace,
            format!("{}_id", name),
            name,
            "",
            settings.language.as_str(),
        ))
    }

    /// Topic for a unit holding several files
    ///
    /// Files are visited in the order given. Documents take their file stem as
    /// title; packages keep the classifier's default.
    pub fn build_unit(
        &self,
        unit_name: &str,
        directory: &Path,
        files: &[String],
    ) -> Result<TopicNode, BuildError> {
        let mut topic = self.topic(unit_name);

        for filename in files {
            let title = if filename.to_lowercase().ends_with(".h5p") {
                None
            } else {
                Some(file_stem(filename))
            };

            if let Some(node) = self.classify(unit_name, directory, filename, title)? {
                topic.add_child(node);
            }
        }

        Ok(topic)
    }

    /// Topic for `base_path/course_name` with one child per non-empty unit
    ///
    /// Only regular files count towards a unit's size. Nested directories
    /// are ignored and never produce nodes, so a unit holding one file and a
    /// subdirectory is still attached unwrapped.
    pub fn build_course(&self, course_name: &str, base_path: &Path) -> Result<TopicNode, BuildError> {
        let course_dir = base_path.join(course_name);
        let mut topic = self.topic(course_name);

        let mut units = list(&course_dir, Entries::Dirs)?;
        self.settings().sort_order.sort(&mut units);
        info!(course = %course_name, units = units.len(), "Building course");

        for unit in &units {
            let unit_dir = course_dir.join(unit);
            let files = list(&unit_dir, Entries::Files)?;

            match files.as_slice() {
                [] => debug!(unit = %unit, "Skipping empty unit"),
                [single] => {
                    if let Some(node) = self.classify(unit, &unit_dir, single, None)? {
                        topic.add_child(node);
                    }
                }
                _ => {
                    let unit_topic = self.build_unit(unit, &unit_dir, &files)?;
                    if unit_topic.is_empty() {
                        debug!(unit = %unit, "No recognised files in unit");
                    } else {
                        topic.add_child(ContentNode::Topic(unit_topic));
                    }
                }
            }
        }

        Ok(topic)
    }

    /// The whole channel: one topic per course directory under `base_path`
    pub fn build_channel(&self, base_path: &Path) -> Result<Channel, BuildError> {
        let mut channel = Channel::new(self.info().clone());

        let mut courses = list(base_path, Entries::Dirs)?;
        self.settings().sort_order.sort(&mut courses);
        info!(
            base = %base_path.display(),
            courses = courses.len(),
            order = %self.settings().sort_order,
            "Building channel"
        );

        for course in &courses {
            let topic = self.build_course(course, base_path)?;
            channel.add_child(ContentNode::Topic(topic));
        }

        Ok(channel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::config::ResolvedConfig;
    use crate::convert::settings::{QuestionSettings, SortOrder};
    use crate::domain::{ChannelInfo, License, NodeKind};
    use tempfile::TempDir;

    fn builder(sort_order: SortOrder) -> ChannelBuilder {
        ChannelBuilder::from_config(&ResolvedConfig {
            channel: ChannelInfo::default(),
            license: License::default(),
            base_path: PathBuf::from("."),
            sort_order,
            author: "Equipo de AIEP".to_string(),
            questions: QuestionSettings::default(),
            config_file: None,
        })
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"%PDF-1.4").unwrap();
    }

    #[test]
    fn test_list_filters_entries() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("a.pdf"));
        fs::create_dir(temp.path().join("sub")).unwrap();

        assert_eq!(list(temp.path(), Entries::Files).unwrap(), vec!["a.pdf"]);
        assert_eq!(list(temp.path(), Entries::Dirs).unwrap(), vec!["sub"]);
    }

    #[test]
    fn test_missing_base_is_error() {
        let result = builder(SortOrder::Ascending).build_channel(Path::new("/nonexistent/cursos"));
        assert!(matches!(result, Err(BuildError::ReadDir { .. })));
    }

    #[test]
    fn test_unit_title_from_stem() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("guia-1.pdf"));
        touch(&temp.path().join("leeme.txt"));

        let files = vec!["guia-1.pdf".to_string(), "leeme.txt".to_string()];
        let topic = builder(SortOrder::Ascending)
            .build_unit("Unidad 1", temp.path(), &files)
            .unwrap();

        assert_eq!(topic.meta.title, "Unidad 1");
        assert_eq!(topic.meta.source_id, "Unidad 1_id");
        assert_eq!(topic.len(), 1);
        assert_eq!(topic.children[0].title(), "guia-1");
    }

    #[test]
    fn test_course_sort_order() {
        let temp = TempDir::new().unwrap();
        for unit in ["Unidad 1", "Unidad 2", "Unidad 3"] {
            touch(&temp.path().join("Curso").join(unit).join("guia.pdf"));
        }

        let titles = |order| {
            let course = builder(order).build_course("Curso", temp.path()).unwrap();
            course
                .children
                .iter()
                .map(|c| c.title().to_string())
                .collect::<Vec<_>>()
        };

        assert_eq!(
            titles(SortOrder::Ascending),
            vec!["Unidad 1", "Unidad 2", "Unidad 3"]
        );
        assert_eq!(
            titles(SortOrder::Descending),
            vec!["Unidad 3", "Unidad 2", "Unidad 1"]
        );
    }

    #[test]
    fn test_unit_subdirectories_ignored() {
        let temp = TempDir::new().unwrap();
        let unit = temp.path().join("Curso").join("Unidad 1");
        touch(&unit.join("guia.pdf"));
        touch(&unit.join("extra").join("otra.pdf"));

        let topic = builder(SortOrder::Ascending)
            .build_course("Curso", temp.path())
            .unwrap();

        assert_eq!(topic.len(), 1);
        assert_eq!(topic.children[0].kind(), NodeKind::Document);
        assert_eq!(topic.children[0].source_id(), "Unidad 1/guia.pdf");
    }

    #[test]
    fn test_empty_and_unrecognised_units_skipped() {
        let temp = TempDir::new().unwrap();
        let course = temp.path().join("Curso");
        fs::create_dir_all(course.join("Vacia")).unwrap();
        touch(&course.join("Notas").join("a.txt"));
        touch(&course.join("Otras").join("a.txt"));
        touch(&course.join("Otras").join("b.doc"));

        let topic = builder(SortOrder::Ascending)
            .build_course("Curso", temp.path())
            .unwrap();

        assert_eq!(topic.meta.source_id, "Curso_id");
        assert!(topic.is_empty());
    }

    #[test]
    fn test_channel_root() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("B").join("U1").join("guia.pdf"));
        touch(&temp.path().join("A").join("U1").join("guia.pdf"));
        touch(&temp.path().join("suelto.pdf"));

        let channel = builder(SortOrder::Ascending)
            .build_channel(temp.path())
            .unwrap();

        assert_eq!(channel.info, ChannelInfo::default());
        assert_eq!(channel.len(), 2);
        assert_eq!(channel.children[0].title(), "A");
        assert_eq!(channel.children[1].title(), "B");
        assert_eq!(channel.stats().count(NodeKind::Document), 2);
    }
}
