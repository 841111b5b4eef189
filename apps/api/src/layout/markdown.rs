//! Plain-text Markdown rendering of a `CvRecord`.
//!
//! Same section order and list policy as the PDF layout (volunteering and
//! references capped, responsibilities trimmed), but no pagination and no
//! font measurement, so any Unicode text is accepted.

use crate::correction::TextCorrector;
use crate::layout::flow::{MAX_REFERENCES, MAX_VOLUNTEERING};
use crate::layout::normalize::{
    normalize, prepare_list_item, single_line, truncate_with_ellipsis, SHORT_ITEM_MAX_CHARS,
};
use crate::models::cv::CvRecord;

pub fn render_markdown(cv: &CvRecord, corrector: &dyn TextCorrector) -> String {
    let mut md = String::new();

    let name = single_line(&cv.name);
    let title = if name.is_empty() {
        "Curriculum Vitae"
    } else {
        name.as_str()
    };
    md.push_str(&format!("# {title}\n"));
    let job_title = single_line(&cv.job_title);
    if !job_title.is_empty() {
        md.push_str(&format!("**{job_title}**\n"));
    }

    let contact = [
        ("Email", &cv.contact.email),
        ("Phone", &cv.contact.phone),
        ("Location", &cv.contact.location),
        ("LinkedIn", &cv.contact.linkedin),
        ("GitHub", &cv.contact.github),
        ("Website", &cv.contact.website),
    ];
    let contact: Vec<_> = contact
        .iter()
        .map(|(label, value)| (label, single_line(value)))
        .filter(|(_, value)| !value.is_empty())
        .collect();
    if !contact.is_empty() {
        md.push_str("\n## Contact\n");
        for (label, value) in contact {
            md.push_str(&format!("- {label}: {value}\n"));
        }
    }

    let summary = normalize(&corrector.correct(&cv.profile_summary));
    if !summary.is_empty() {
        md.push_str(&format!("\n## Summary\n{summary}\n"));
    }

    if !cv.skills.is_empty() {
        md.push_str("\n## Skills\n");
        for group in &cv.skills {
            let items = group
                .items
                .iter()
                .map(|i| single_line(i))
                .filter(|i| !i.is_empty())
                .collect::<Vec<_>>()
                .join(", ");
            let category = single_line(&group.category);
            match (category.is_empty(), items.is_empty()) {
                (true, true) => {}
                (true, false) => md.push_str(&format!("- {items}\n")),
                (false, true) => md.push_str(&format!("- {category}\n")),
                (false, false) => md.push_str(&format!("- {category}: {items}\n")),
            }
        }
    }

    if !cv.experience.is_empty() {
        md.push_str("\n## Work Experience\n");
        for job in &cv.experience {
            md.push_str(&format!(
                "- {}\n",
                with_duration(&single_line(&job.heading()), &job.duration)
            ));
            for responsibility in &job.responsibilities {
                let item = prepare_list_item(&normalize(&corrector.correct(responsibility)));
                if !item.is_empty() {
                    md.push_str(&format!("  - {item}\n"));
                }
            }
        }
    }

    if !cv.projects.is_empty() {
        md.push_str("\n## Projects\n");
        for project in &cv.projects {
            md.push_str(&format!("- {}\n", single_line(&project.heading())));
            let description = single_line(&normalize(&corrector.correct(&project.description)));
            if !description.is_empty() {
                md.push_str(&format!("  - {description}\n"));
            }
            let technologies = project
                .technologies
                .iter()
                .map(|t| single_line(t))
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>();
            if !technologies.is_empty() {
                md.push_str(&format!("  - Technologies: {}\n", technologies.join(", ")));
            }
        }
    }

    if !cv.education.is_empty() {
        md.push_str("\n## Education\n");
        for entry in &cv.education {
            let heading = [single_line(&entry.degree), single_line(&entry.institution)]
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(", ");
            md.push_str(&format!("- {}\n", with_duration(&heading, &entry.duration)));
            let details = single_line(&entry.details);
            if !details.is_empty() {
                md.push_str(&format!("  - {details}\n"));
            }
        }
    }

    let volunteering: Vec<String> = cv
        .volunteering_and_leadership
        .iter()
        .map(|v| single_line(v))
        .filter(|v| !v.is_empty())
        .take(MAX_VOLUNTEERING)
        .collect();
    if !volunteering.is_empty() {
        md.push_str("\n## Volunteering & Leadership\n");
        for entry in volunteering {
            md.push_str(&format!(
                "- {}\n",
                truncate_with_ellipsis(&entry, SHORT_ITEM_MAX_CHARS)
            ));
        }
    }

    if !cv.references.is_empty() {
        md.push_str("\n## References\n");
        for reference in cv.references.iter().take(MAX_REFERENCES) {
            let fields = [
                &reference.name,
                &reference.title,
                &reference.phone,
                &reference.email,
            ]
            .into_iter()
            .map(|f| single_line(f))
            .filter(|f| !f.is_empty())
            .collect::<Vec<_>>();
            if !fields.is_empty() {
                md.push_str(&format!("- {}\n", fields.join(", ")));
            }
        }
    }

    md
}

/// "Heading (Duration)", or whichever half is present.
fn with_duration(heading: &str, duration: &str) -> String {
    let duration = single_line(duration);
    match (heading.is_empty(), duration.is_empty()) {
        (_, true) => heading.to_string(),
        (true, false) => format!("({duration})"),
        (false, false) => format!("{heading} ({duration})"),
    }
}
