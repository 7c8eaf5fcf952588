//! Fixed pattern tables for the two detection profiles. Compiled once on first use.

use std::sync::OnceLock;

use regex::Regex;

use crate::detection::DetectionKind;

/// Per-pattern score ceiling so one repeated keyword cannot dominate.
pub const MAX_PATTERN_SCORE: f64 = 5.0;
/// Bonus for a technology that also appears in the skills / requirements section.
pub const SECTION_BONUS: f64 = 2.0;

pub struct TechPattern {
    regex: Regex,
    /// Matches immediately followed by this (e.g. `Java` + `script`) do not count.
    excluded_suffix: Option<Regex>,
    pub skill: &'static str,
    pub weight: f64,
}

impl TechPattern {
    pub fn count(&self, text: &str) -> usize {
        self.regex
            .find_iter(text)
            .filter(|m| match &self.excluded_suffix {
                Some(suffix) => !suffix.is_match(&text[m.end()..]),
                None => true,
            })
            .count()
    }
}

/// A label plus the phrases that vote for it.
pub struct LabelGroup {
    pub label: &'static str,
    patterns: Vec<Regex>,
}

impl LabelGroup {
    pub fn count(&self, text: &str) -> usize {
        self.patterns.iter().map(|p| p.find_iter(text).count()).sum()
    }
}

pub struct ProfileTables {
    pub tech: Vec<TechPattern>,
    pub roles: Vec<LabelGroup>,
    /// Empty for profiles without a level label.
    pub levels: Vec<LabelGroup>,
    /// Capture group 1 is the section that earns `SECTION_BONUS`.
    pub section: Regex,
}

fn ci(pattern: &str) -> Regex {
    Regex::new(&format!("(?i){pattern}")).expect("detection pattern must compile")
}

fn tech(pattern: &str, skill: &'static str, weight: f64) -> TechPattern {
    TechPattern {
        regex: ci(pattern),
        excluded_suffix: None,
        skill,
        weight,
    }
}

fn java(excluded_suffix: &str) -> TechPattern {
    TechPattern {
        excluded_suffix: Some(ci(excluded_suffix)),
        ..tech(r"\bjava\b", "Java", 1.0)
    }
}

fn group(label: &'static str, patterns: &[&str]) -> LabelGroup {
    LabelGroup {
        label,
        patterns: patterns.iter().map(|p| ci(p)).collect(),
    }
}

pub fn tables(kind: DetectionKind) -> &'static ProfileTables {
    static RESUME: OnceLock<ProfileTables> = OnceLock::new();
    static JOB: OnceLock<ProfileTables> = OnceLock::new();
    match kind {
        DetectionKind::Resume => RESUME.get_or_init(resume_tables),
        DetectionKind::JobDescription => JOB.get_or_init(job_tables),
    }
}

fn resume_tables() -> ProfileTables {
    ProfileTables {
        tech: vec![
            tech(r"\b(react|react\.js|reactjs)\b", "React", 1.0),
            tech(r"\b(node|node\.js|nodejs)\b", "Node.js", 1.0),
            tech(r"\bpython\b", "Python", 1.0),
            java(r"^script"),
            tech(r"\bjavascript\b", "JavaScript", 1.0),
            tech(r"\btypescript\b", "TypeScript", 1.0),
            tech(r"\b(aws|amazon web services)\b", "AWS", 1.0),
            tech(r"\bdocker\b", "Docker", 1.0),
            tech(r"\b(kubernetes|k8s)\b", "Kubernetes", 1.2),
            tech(r"\b(sql|mysql|postgresql|postgres)\b", "SQL", 0.8),
            tech(r"\b(mongodb|mongo)\b", "MongoDB", 1.0),
            tech(r"\bgolang\b", "Go", 1.2),
            tech(r"\brust\b", "Rust", 1.2),
            tech(r"\bc\+\+|\bcpp\b", "C++", 1.0),
            tech(r"\b(machine learning|deep learning)\b", "ML", 1.5),
            tech(r"\b(tensorflow|pytorch|keras)\b", "ML", 1.3),
            tech(r"\b(spring boot|spring framework)\b", "Spring", 1.2),
            tech(r"\bangular\b", "Angular", 1.0),
            tech(r"\b(vue|vue\.js|vuejs)\b", "Vue.js", 1.0),
            tech(r"\b(next\.js|nextjs)\b", "Next.js", 1.1),
            tech(r"\bgraphql\b", "GraphQL", 1.1),
            tech(r"\bredis\b", "Redis", 0.9),
            tech(r"\bkafka\b", "Kafka", 1.2),
            tech(r"\belasticsearch\b", "Elasticsearch", 1.1),
        ],
        roles: vec![
            group(
                "Software Engineer",
                &[r"software engineer", r"software developer", r"swe\b"],
            ),
            group(
                "Frontend Engineer",
                &[
                    r"frontend engineer",
                    r"front.?end developer",
                    r"ui engineer",
                    r"react developer",
                ],
            ),
            group(
                "Backend Engineer",
                &[
                    r"backend engineer",
                    r"back.?end developer",
                    r"server.?side",
                    r"api developer",
                ],
            ),
            group(
                "Full Stack Engineer",
                &[r"full.?stack engineer", r"full.?stack developer"],
            ),
            group(
                "Data/ML Engineer",
                &[
                    r"data scientist",
                    r"ml engineer",
                    r"machine learning engineer",
                    r"ai engineer",
                ],
            ),
            group(
                "DevOps Engineer",
                &[
                    r"devops engineer",
                    r"sre\b",
                    r"site reliability",
                    r"platform engineer",
                    r"infrastructure",
                ],
            ),
            group(
                "Product Manager",
                &[r"product manager", r"product owner", r"\bpm\b"],
            ),
            group(
                "UX Designer",
                &[
                    r"ux designer",
                    r"ui designer",
                    r"product designer",
                    r"user experience",
                ],
            ),
            group(
                "Mobile Engineer",
                &[
                    r"mobile engineer",
                    r"ios developer",
                    r"android developer",
                    r"mobile developer",
                ],
            ),
            group(
                "Data Engineer",
                &[r"data engineer", r"etl developer", r"data architect"],
            ),
            group(
                "Security Engineer",
                &[r"security engineer", r"cybersecurity", r"infosec"],
            ),
            group(
                "QA Engineer",
                &[
                    r"qa engineer",
                    r"test engineer",
                    r"sdet",
                    r"quality assurance",
                ],
            ),
        ],
        levels: Vec::new(),
        // The line after a "skill(s)" heading, plus continuation lines that do not start
        // with a letter (bullets, indentation).
        section: ci(r"skills?[:\s]*([^\n]+(?:\n[^A-Za-z\n][^\n]*)*)"),
    }
}

fn job_tables() -> ProfileTables {
    ProfileTables {
        tech: vec![
            tech(r"\b(react|react\.js|reactjs)\b", "React", 1.0),
            tech(r"\b(node|node\.js|nodejs)\b", "Node.js", 1.0),
            tech(r"\bpython\b", "Python", 1.0),
            java(r"^\s*script"),
            tech(r"\bjavascript\b", "JavaScript", 1.0),
            tech(r"\btypescript\b", "TypeScript", 1.0),
            tech(r"\b(aws|amazon web services)\b", "AWS", 1.0),
            tech(r"\bdocker\b", "Docker", 1.0),
            tech(r"\b(kubernetes|k8s)\b", "Kubernetes", 1.2),
            tech(r"\b(sql|mysql|postgresql|postgres)\b", "SQL", 0.8),
            tech(r"\b(mongodb|mongo)\b", "MongoDB", 1.0),
            tech(r"\bgolang\b", "Go", 1.2),
            tech(r"\brust\b", "Rust", 1.2),
            tech(r"\bgraphql\b", "GraphQL", 1.1),
            tech(r"\bredis\b", "Redis", 0.9),
            tech(r"\b(spring boot|spring framework|spring)\b", "Spring", 1.2),
            tech(r"\bangular\b", "Angular", 1.0),
            tech(r"\b(vue|vue\.js|vuejs)\b", "Vue.js", 1.0),
            tech(r"\b(next\.js|nextjs)\b", "Next.js", 1.1),
            tech(r"\bkafka\b", "Kafka", 1.2),
            tech(r"\belasticsearch\b", "Elasticsearch", 1.1),
            tech(r"\bterraform\b", "Terraform", 1.1),
            tech(r"\b(jenkins|ci/cd)\b", "CI/CD", 0.9),
            tech(r"\b(machine learning|deep learning|ml)\b", "ML", 1.3),
            tech(r"\b(tensorflow|pytorch|keras)\b", "ML", 1.3),
        ],
        roles: vec![
            group(
                "Frontend Engineer",
                &[
                    r"frontend engineer",
                    r"front.?end developer",
                    r"ui engineer",
                    r"react engineer",
                    r"frontend developer",
                ],
            ),
            group(
                "Backend Engineer",
                &[
                    r"backend engineer",
                    r"back.?end developer",
                    r"server.?side engineer",
                    r"api engineer",
                    r"backend developer",
                ],
            ),
            group(
                "Full Stack Engineer",
                &[r"full.?stack engineer", r"full.?stack developer", r"full stack"],
            ),
            group(
                "Data/ML Engineer",
                &[
                    r"data scientist",
                    r"ml engineer",
                    r"machine learning engineer",
                    r"ai engineer",
                    r"applied scientist",
                ],
            ),
            group(
                "DevOps/SRE",
                &[
                    r"devops engineer",
                    r"\bsre\b",
                    r"site reliability engineer",
                    r"platform engineer",
                    r"infrastructure engineer",
                    r"cloud engineer",
                ],
            ),
            group(
                "Product Manager",
                &[r"product manager", r"product owner", r"technical pm"],
            ),
            group(
                "Mobile Engineer",
                &[
                    r"mobile engineer",
                    r"ios engineer",
                    r"android engineer",
                    r"mobile developer",
                    r"react native",
                    r"flutter developer",
                ],
            ),
            group(
                "Data Engineer",
                &[
                    r"data engineer",
                    r"etl developer",
                    r"data architect",
                    r"analytics engineer",
                ],
            ),
            group(
                "Security Engineer",
                &[
                    r"security engineer",
                    r"cybersecurity",
                    r"application security",
                    r"security analyst",
                ],
            ),
            group(
                "QA Engineer",
                &[
                    r"qa engineer",
                    r"test engineer",
                    r"sdet",
                    r"quality assurance",
                    r"automation engineer",
                ],
            ),
            group(
                "Software Engineer",
                &[
                    r"software engineer",
                    r"software developer",
                    r"sde\b",
                    r"engineer",
                    r"developer",
                ],
            ),
        ],
        levels: vec![
            group(
                "Senior",
                &[
                    r"senior\s+(?:software\s+)?engineer",
                    r"sr\.\s+engineer",
                    r"\bsenior\b",
                    r"\blead\b",
                    r"principal",
                    r"staff engineer",
                    r"\biii\b",
                    r"level\s*[3-5]",
                ],
            ),
            group(
                "Junior",
                &[
                    r"junior\s+(?:software\s+)?engineer",
                    r"jr\.\s+engineer",
                    r"\bjunior\b",
                    r"entry.?level",
                    r"new grad",
                    r"graduate",
                    r"\bintern\b",
                    r"\bi\s+(?:engineer|developer)",
                ],
            ),
            group(
                "Leadership",
                &[
                    r"engineering manager",
                    r"tech lead",
                    r"director",
                    r"head of",
                    r"vp of engineering",
                    r"chief",
                ],
            ),
        ],
        // From a requirements-style heading up to the next preferred/bonus/other section.
        section: ci(
            r"(?s)(?:required|requirements|must have|qualifications)[:\s]*(.*?)(?:preferred|nice to have|bonus|responsibilities|about|$)",
        ),
    }
}

/// "N years experience" phrase used to infer a level when no level keyword matched.
pub fn years_of_experience() -> &'static Regex {
    static YEARS: OnceLock<Regex> = OnceLock::new();
    YEARS.get_or_init(|| ci(r"(\d+)\+?\s*(?:years?|yrs?)\s*(?:of\s+)?(?:experience|exp)"))
}
