//! Keyword-weighted role / level / technology detection.
//!
//! Pure and deterministic: the same text and kind always yield the same `Detection`.

use std::cmp::Ordering;

use crate::detection::patterns::{
    tables, years_of_experience, ProfileTables, MAX_PATTERN_SCORE, SECTION_BONUS,
};
use crate::detection::{Detection, DetectionKind};

/// Texts shorter than this (in characters) carry too little signal.
pub const MIN_TEXT_CHARS: usize = 100;

const SENIOR_MIN_YEARS: u32 = 7;
const MID_MIN_YEARS: u32 = 3;
const DEFAULT_LEVEL: &str = "Mid-Level";

struct Profile {
    top_technologies: usize,
    fallback_role: &'static str,
}

fn profile(kind: DetectionKind) -> Profile {
    match kind {
        DetectionKind::Resume => Profile {
            top_technologies: 6,
            fallback_role: "Tech Professional",
        },
        DetectionKind::JobDescription => Profile {
            top_technologies: 8,
            fallback_role: "Software Engineer",
        },
    }
}

/// Returns `None` for short text or text with neither a role signal nor a technology.
pub fn detect(text: &str, kind: DetectionKind) -> Option<Detection> {
    if text.chars().count() < MIN_TEXT_CHARS {
        return None;
    }

    let tables = tables(kind);
    let profile = profile(kind);

    let technologies: Vec<&'static str> = score_technologies(text, tables)
        .into_iter()
        .take(profile.top_technologies)
        .map(|(skill, _)| skill)
        .collect();

    let mut role_scores = score_labels(text, tables);
    match kind {
        DetectionKind::Resume => infer_resume_role(&mut role_scores, &technologies),
        DetectionKind::JobDescription => infer_job_role(&mut role_scores, &technologies),
    }
    let (role, max_score) = best_label(&role_scores, profile.fallback_role);

    if technologies.is_empty() && max_score == 0 {
        return None;
    }

    let (level, level_score) = match kind {
        DetectionKind::Resume => (None, 0),
        DetectionKind::JobDescription => {
            let (level, score) = detect_level(text, tables);
            (Some(level), score)
        }
    };

    let confidence = match kind {
        DetectionKind::Resume => resume_confidence(max_score, technologies.len(), text),
        DetectionKind::JobDescription => {
            job_confidence(max_score, technologies.len(), level_score, text)
        }
    };

    Some(Detection {
        role: role.to_string(),
        level: level.map(str::to_string),
        technologies: technologies.into_iter().map(str::to_string).collect(),
        confidence,
    })
}

/// Per-skill scores, highest first. Ties keep table order.
fn score_technologies(text: &str, tables: &ProfileTables) -> Vec<(&'static str, f64)> {
    let mut scores: Vec<(&'static str, f64)> = Vec::new();

    for pattern in &tables.tech {
        let count = pattern.count(text);
        if count > 0 {
            let score = (count as f64 * pattern.weight).min(MAX_PATTERN_SCORE);
            add_score(&mut scores, pattern.skill, score);
        }
    }

    if let Some(section) = tables
        .section
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
    {
        for pattern in &tables.tech {
            if pattern.count(section) > 0 {
                add_score(&mut scores, pattern.skill, SECTION_BONUS);
            }
        }
    }

    // sort_by is stable
    scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scores
}

fn add_score<S: Copy + std::ops::AddAssign>(
    scores: &mut Vec<(&'static str, S)>,
    label: &'static str,
    amount: S,
) {
    match scores.iter_mut().find(|(l, _)| *l == label) {
        Some((_, score)) => *score += amount,
        None => scores.push((label, amount)),
    }
}

fn score_labels(text: &str, tables: &ProfileTables) -> Vec<(&'static str, u32)> {
    tables
        .roles
        .iter()
        .filter_map(|group| {
            let count = group.count(text) as u32;
            (count > 0).then_some((group.label, count))
        })
        .collect()
}

/// First label with the strictly highest score, or the fallback at 0.
fn best_label(
    scores: &[(&'static str, u32)],
    fallback: &'static str,
) -> (&'static str, u32) {
    let mut best = (fallback, 0);
    for &(label, score) in scores {
        if score > best.1 {
            best = (label, score);
        }
    }
    best
}

fn count_in(technologies: &[&str], group: &[&str]) -> u32 {
    technologies.iter().filter(|t| group.contains(t)).count() as u32
}

fn infer_job_role(scores: &mut Vec<(&'static str, u32)>, technologies: &[&str]) {
    let generic_only = scores.len() == 1 && scores[0].0 == "Software Engineer";
    if !scores.is_empty() && !generic_only {
        return;
    }

    let frontend = count_in(technologies, &["React", "Vue.js", "Angular", "Next.js"]);
    let backend = count_in(
        technologies,
        &["Java", "Spring", "Node.js", "Go", "Python", "SQL", "MongoDB", "Redis", "Kafka"],
    );
    let ml = count_in(technologies, &["ML", "Python"]);
    let devops = count_in(
        technologies,
        &["Docker", "Kubernetes", "AWS", "Terraform", "CI/CD"],
    );

    if ml >= 2 {
        add_score(scores, "Data/ML Engineer", ml * 2);
    } else if devops >= 3 {
        add_score(scores, "DevOps/SRE", devops * 2);
    } else if frontend >= 2 && backend < 2 {
        add_score(scores, "Frontend Engineer", frontend * 2);
    } else if backend >= 3 && frontend < 2 {
        add_score(scores, "Backend Engineer", backend * 2);
    } else if frontend >= 2 && backend >= 2 {
        add_score(scores, "Full Stack Engineer", frontend + backend);
    }
}

fn infer_resume_role(scores: &mut Vec<(&'static str, u32)>, technologies: &[&str]) {
    if !scores.is_empty() || technologies.is_empty() {
        return;
    }

    let frontend = count_in(
        technologies,
        &["React", "Vue.js", "Angular", "Next.js", "CSS"],
    );
    let backend = count_in(
        technologies,
        &["Java", "Spring", "Node.js", "Go", "Python", "SQL", "MongoDB"],
    );
    let ml = count_in(technologies, &["ML", "Python", "TensorFlow", "PyTorch"]);
    let devops = count_in(technologies, &["Docker", "Kubernetes", "AWS", "Terraform"]);

    let (role, score) = if ml >= 2 {
        ("Data/ML Engineer", ml)
    } else if devops >= 2 {
        ("DevOps Engineer", devops)
    } else if frontend >= 2 && backend >= 2 {
        ("Full Stack Engineer", frontend + backend)
    } else if frontend > backend {
        ("Frontend Engineer", frontend)
    } else if backend > 0 {
        ("Backend Engineer", backend)
    } else {
        ("Software Engineer", 1)
    };
    scores.push((role, score));
}

/// Level label and the keyword score behind it. Years of experience are only consulted
/// when no level keyword matched.
fn detect_level(text: &str, tables: &ProfileTables) -> (&'static str, u32) {
    let scores: Vec<(&'static str, u32)> = tables
        .levels
        .iter()
        .filter_map(|group| {
            let count = group.count(text) as u32;
            (count > 0).then_some((group.label, count))
        })
        .collect();

    match best_label(&scores, DEFAULT_LEVEL) {
        (_, 0) => (level_from_years(text).unwrap_or(DEFAULT_LEVEL), 0),
        best => best,
    }
}

fn level_from_years(text: &str) -> Option<&'static str> {
    let years: u32 = years_of_experience()
        .captures(text)?
        .get(1)?
        .as_str()
        .parse()
        .ok()?;

    Some(match years {
        y if y >= SENIOR_MIN_YEARS => "Senior",
        y if y >= MID_MIN_YEARS => "Mid-Level",
        _ => "Junior",
    })
}

fn tag_bonus(tech_count: usize) -> u32 {
    match tech_count {
        n if n >= 5 => 20,
        n if n >= 3 => 15,
        n if n >= 1 => 10,
        _ => 0,
    }
}

fn job_confidence(max_role_score: u32, tech_count: usize, level_score: u32, text: &str) -> u8 {
    let mut confidence: u32 = 50;
    confidence += match max_role_score {
        s if s >= 3 => 20,
        s if s >= 1 => 10,
        _ => 0,
    };
    confidence += tag_bonus(tech_count);
    confidence += match level_score {
        s if s >= 2 => 10,
        s if s >= 1 => 5,
        _ => 0,
    };
    if text.chars().count() > 1500 {
        confidence += 10;
    }
    confidence.min(95) as u8
}

fn resume_confidence(max_role_score: u32, tech_count: usize, text: &str) -> u8 {
    let mut confidence: u32 = 50;
    confidence += match max_role_score {
        s if s >= 3 => 25,
        s if s >= 2 => 20,
        s if s >= 1 => 15,
        _ => 0,
    };
    confidence += tag_bonus(tech_count);
    let length = text.chars().count();
    if length > 2000 {
        confidence += 10;
    } else if length > 1000 {
        confidence += 5;
    }
    confidence.min(95) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENIOR_BACKEND_JD: &str = "We are hiring a Senior Backend Engineer to own our data platform. \
        You will tune PostgreSQL and operate Kubernetes clusters. Kubernetes runs every service, \
        Kubernetes handles deploys, Kubernetes scales workers, and Kubernetes hosts the PostgreSQL replicas.";

    #[test]
    fn test_senior_backend_job_description() {
        let detection = detect(SENIOR_BACKEND_JD, DetectionKind::JobDescription).unwrap();
        assert_eq!(detection.role, "Backend Engineer");
        assert_eq!(detection.level.as_deref(), Some("Senior"));
        assert_eq!(detection.technologies, vec!["Kubernetes", "SQL"]);
        // 50 + 10 (role) + 10 (two techs) + 5 (one level keyword)
        assert_eq!(detection.confidence, 75);
    }

    #[test]
    fn test_detection_is_deterministic() {
        let first = detect(SENIOR_BACKEND_JD, DetectionKind::JobDescription);
        for _ in 0..5 {
            assert_eq!(detect(SENIOR_BACKEND_JD, DetectionKind::JobDescription), first);
        }
    }

    #[test]
    fn test_short_text_is_not_detected() {
        let text = "Senior Rust engineer, Kubernetes, AWS";
        assert!(detect(text, DetectionKind::JobDescription).is_none());
        assert!(detect(text, DetectionKind::Resume).is_none());
    }

    #[test]
    fn test_text_without_signals_is_not_detected() {
        let text = "The quick brown fox jumps over the lazy dog. ".repeat(3);
        assert!(text.chars().count() >= MIN_TEXT_CHARS);
        assert!(detect(&text, DetectionKind::JobDescription).is_none());
        assert!(detect(&text, DetectionKind::Resume).is_none());
    }

    #[test]
    fn test_pattern_score_is_capped() {
        let text = "Kubernetes ".repeat(10) + "Rust Rust";
        let scores = score_technologies(&text, tables(DetectionKind::JobDescription));
        assert_eq!(scores[0], ("Kubernetes", MAX_PATTERN_SCORE));
        assert_eq!(scores[1].0, "Rust");
    }

    #[test]
    fn test_resume_skills_section_bonus() {
        let text = "Jane Doe\nSoftware developer with experience building APIs.\n\
            Skills: Python, Django, PostgreSQL, Docker\n- AWS, Kubernetes\n\
            Experience\nBuilt Python services on AWS.";
        let detection = detect(text, DetectionKind::Resume).unwrap();
        assert_eq!(detection.role, "Software Engineer");
        assert_eq!(detection.level, None);
        assert_eq!(
            detection.technologies,
            vec!["Python", "AWS", "Kubernetes", "Docker", "SQL"]
        );
        // 50 + 15 (role) + 20 (five techs)
        assert_eq!(detection.confidence, 85);
    }

    #[test]
    fn test_resume_role_inferred_from_stack() {
        let text = "Projects\nBuilt dashboards in React and Next.js with Angular components, \
            plus Vue.js prototypes and more React hooks for the team.";
        let detection = detect(text, DetectionKind::Resume).unwrap();
        assert_eq!(detection.role, "Frontend Engineer");
        assert_eq!(detection.technologies[0], "React");
        // 50 + 25 (role score 4) + 15 (four techs)
        assert_eq!(detection.confidence, 90);
    }

    #[test]
    fn test_job_level_from_years() {
        let text = "We need a backend developer with 8+ years of experience in Python and Kafka \
            building streaming pipelines for payments at scale.";
        let detection = detect(text, DetectionKind::JobDescription).unwrap();
        assert_eq!(detection.role, "Backend Engineer");
        assert_eq!(detection.level.as_deref(), Some("Senior"));
    }

    #[test]
    fn test_job_level_defaults_to_mid() {
        let text = "Backend developer wanted for our payments team. You will build Go services \
            backed by PostgreSQL and Redis, and review designs with peers.";
        let detection = detect(text, DetectionKind::JobDescription).unwrap();
        assert_eq!(detection.level.as_deref(), Some("Mid-Level"));
    }

    #[test]
    fn test_level_from_years_bands() {
        assert_eq!(level_from_years("1 year experience"), Some("Junior"));
        assert_eq!(level_from_years("3 yrs exp"), Some("Mid-Level"));
        assert_eq!(level_from_years("6 years of experience"), Some("Mid-Level"));
        assert_eq!(level_from_years("7+ years of experience"), Some("Senior"));
        assert_eq!(level_from_years("no numbers here"), None);
    }

    #[test]
    fn test_generic_job_role_upgraded_by_stack() {
        let mut scores = vec![("Software Engineer", 2)];
        infer_job_role(&mut scores, &["Docker", "Kubernetes", "AWS"]);
        assert_eq!(best_label(&scores, "Software Engineer"), ("DevOps/SRE", 6));
    }

    #[test]
    fn test_best_label_keeps_first_on_tie() {
        let scores = [("Frontend Engineer", 2), ("Backend Engineer", 2)];
        assert_eq!(best_label(&scores, "x"), ("Frontend Engineer", 2));
        assert_eq!(best_label(&[], "Tech Professional"), ("Tech Professional", 0));
    }

    #[test]
    fn test_confidence_is_bounded() {
        let long = "x".repeat(3000);
        assert_eq!(job_confidence(5, 8, 2, &long), 95);
        assert_eq!(resume_confidence(5, 8, &long), 95);
        assert_eq!(job_confidence(0, 0, 0, "short"), 50);
        assert_eq!(resume_confidence(2, 1, &"x".repeat(1200)), 85);
    }
}
