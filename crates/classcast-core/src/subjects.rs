//! Subject label to subject-id mapping.
//!
//! The mapping is process-wide static configuration: built once at startup,
//! injected into the extractor, and never mutated at run time. An unresolved
//! subject is a hard validation failure upstream of any upload.

use std::collections::HashMap;

/// Immutable subject → id lookup table.
#[derive(Debug, Clone)]
pub struct SubjectMap {
    entries: HashMap<String, i32>,
}

impl SubjectMap {
    /// Build a map from explicit pairs. Intended for tests and alternate
    /// deployments; production uses [`SubjectMap::default`].
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, i32)>,
        S: Into<String>,
    {
        Self {
            entries: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn resolve(&self, subject: &str) -> Option<i32> {
        self.entries.get(subject).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for SubjectMap {
    /// The curriculum table the uploader ships with.
    fn default() -> Self {
        Self::from_pairs([
            ("SDLC", 65),
            ("JIRA-Agile", 4),
            ("UNIX", 12),
            ("HTTP Webservices", 1),
            ("RestAssured", 23),
            ("NOSQL", 5),
            ("MYSQL", 5),
            ("SQL1", 5),
            ("SQL2", 5),
            ("SQL3", 5),
            ("SQL4", 5),
            ("SQL5", 5),
            ("Python", 59),
            ("HTML", 64),
            ("HTML5", 29),
            ("CSS", 6),
            ("Tailwind CSS", 46),
            ("DOM", 47),
            ("ReactJS", 42),
            ("Router", 48),
            ("Redux", 27),
            ("Webpack", 36),
            ("NextJS", 49),
            ("Cypress", 11),
            ("GraphQL", 13),
            ("MongoDB", 7),
            ("NodeJS", 34),
            ("ExpressJS", 35),
            ("ReactNative", 43),
            ("Software Architecture", 2),
            ("NumPy", 54),
            ("Pandas", 55),
            ("Matplotlib", 63),
            ("EssentialMathForML", 56),
            ("SuperivisedLearningAlgorithms", 57),
            ("UnsupervisedLearningAlgorithms", 58),
            ("ReinforcementLearning", 62),
            ("NeuralNetwork", 60),
            ("DeepLearning", 61),
            ("NaturalLanguageProcess(NLP)", 51),
            ("Gen AI", 52),
            ("ComputerVisionTechnigues(CVT)", 53),
            ("Docker", 67),
            ("Git and GitHub", 66),
            ("RestApi", 68),
            ("Pytorch", 52),
            ("ML", 54),
            ("Scikit Learn", 56),
            ("Deep Learning", 52),
            ("Kubernetes", 52),
            ("Jenkins", 54),
            ("FastAPI", 56),
            ("AWS", 52),
            ("Pydantic", 52),
        ])
    }
}
