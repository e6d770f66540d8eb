// Prompt constants for the gap analysis call.
// The three output headings are part of the contract with whoever renders the report.

pub const JD_PLACEHOLDER: &str = "{jd_text}";
pub const RESUME_PLACEHOLDER: &str = "{resume_text}";

/// Gap analysis prompt template. Replace `{jd_text}` and `{resume_text}` before sending.
pub const GAP_ANALYSIS_PROMPT_TEMPLATE: &str = r#"You are a technical recruiter analyzing a candidate's resume against a job description.

JOB DESCRIPTION:
{jd_text}

CANDIDATE'S RESUME:
{resume_text}

TASK: Compare TECHNICAL SKILLS ONLY between the JD and Resume.

Focus exclusively on:
- Programming languages
- Frameworks and libraries
- Tools and technologies
- Databases
- Cloud platforms
- APIs and integrations
- Version control systems
- CI/CD tools
- Testing frameworks

Provide your analysis in this format:

## MISSING TECHNICAL SKILLS
List each technical skill, technology, or tool mentioned in the JD but NOT found in the resume.
For each missing skill, suggest a specific project the candidate can build to demonstrate that skill.

Format:
- **[Missing Skill/Technology]**: Brief project idea (1-2 sentences) that would demonstrate this skill effectively.

Example:
- **Go Programming**: Build a REST API service in Go with CRUD operations, Docker containerization, and unit tests.
- **Redis**: Create a caching layer for a web application using Redis to improve response times.

## TECHNICAL FIT SCORE: X/100
Score based purely on technical skill alignment (consider both presence and depth of skills).

## PROJECT RECOMMENDATIONS SUMMARY
Provide 3-5 priority projects the candidate should build to maximize their fit for this role.
List them in order of importance based on the JD requirements.

Format each as:
1. **[Project Name]**: [Brief description] - Covers: [Skills this project would demonstrate]

Keep your analysis objective and focused on technical competencies only. Ignore soft skills, cultural fit, or non-technical requirements."#;
