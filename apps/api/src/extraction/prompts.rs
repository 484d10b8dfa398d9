// All AI prompt constants for the Extraction module.
// Templates carry `{placeholder}` slots replaced before sending.

/// Resume field extraction. Replace `{current_date}` and `{content}`.
pub const RESUME_PARSE_PROMPT: &str = r#"You are a professional resume parsing assistant. Extract structured information from the following plain-text resume, precisely.

[Current date for reference]: {current_date}
Use the current date to judge the candidate's latest status (for example when computing years of experience).

CORE RULES - name extraction:
1. Extract the candidate's name exactly as written in the resume body. If the resume is written in a non-Latin script, return the name in that script; do NOT romanize or translate it.
2. Never guess the name from the file name or an email address; it must come from the resume body.
3. If the same name appears several times, pick the most plausible candidate name.

Other fields:
- education: school name and degree, including the graduation year when present.
- skills: concrete hard skills and tool names (list of strings).
- experience: a brief summary of the most recent position (company + title).
- summary: a professional summary of at most 50 words based on the resume content.

Resume content:
{content}"#;

/// Job-description field extraction. Replace `{content}`.
pub const JD_PARSE_PROMPT: &str = r#"You are a professional HR assistant. Extract EVERY job requirement found in the provided raw text, precisely.

Definitions:
1. Original JD: sections such as "Responsibilities", "Requirements", "Qualifications" are the client's original posting.
2. Key clarification: sections such as "Key clarification", "Special notes", "Clarified items" are the FINAL standard confirmed with the client after follow-up, and take priority over the original posting.

Extraction rules:
1. jobCode: look carefully for fields like "Requisition code", "Requisition ID", "Job ID", "Code". Extract it whenever present; empty string otherwise.
2. keyClarification: highest-priority field. It usually carries more specific or corrected requirements than the generic posting (for example a corrected education bar, or a mandatory industry background).
3. title: use the name exactly as it appears in the document.
4. Completeness: identify every independent position in the document.

Return for each position:
- jobCode: requisition code/ID (empty string when absent).
- title: the original position name.
- keyClarification: clarification/special-notes content (empty string when absent).
- description: overall position description.
- responsibilities: the client's original duty list.
- requirements: the client's original requirements (education, skills list, experience, abilities list).

Input content:
{content}"#;

/// Batch job-description parsing for spreadsheet imports.
/// Replace `{batch_json}`.
pub const JD_BATCH_PARSE_PROMPT: &str = r#"You are a professional HR assistant. Parse the following job requisitions in one batch.

Input format:
A JSON array; each element is one requisition with:
- rowIndex: row number (for result matching; MUST be returned unchanged)
- jobCode: requisition code (when empty, try to extract one from rawContent)
- title: position name (when empty, extract one from rawContent)
- rawContent: the raw posting text
- keyClarification: clarification content

Output requirements:
Return a JSON array; each element corresponds to one requisition with:
- rowIndex: the input row number, unchanged
- jobCode: requisition code
- title: position name
- keyClarification: clarification (prefer the input value; extract from rawContent only when the input is empty)
- description: overall position description
- responsibilities: duty list
- requirements: requirements object { education, skills[], experience, abilities[] }

Requisitions to parse:
{batch_json}"#;

/// Resume-vs-jobs scoring. Replace `{current_date}`, `{resume_text}`,
/// `{jd_count}`, `{jd_descriptions}`.
pub const MATCH_PROMPT: &str = r#"You are an extremely rigorous technical interviewer. Match the candidate's resume against the {jd_count} selected job requisitions across every dimension.

[Current date]: {current_date}

[Candidate resume]:
{resume_text}

[Jobs to match]:
{jd_descriptions}

MATCHING RULES - critically important:
0. Time and status context:
   - Graduation: compute the candidate's graduation status against the current date. A graduation date in the past, or within the next 6 months, counts as "graduated / new grad", never as "still a student".
   - Part-time degrees (self-taught, adult education, correspondence): when the resume also shows full-time work history, the candidate is an experienced hire, never an intern or student.

1. Key-clarification override:
   - "Responsibilities" and "Requirements" are the client's ORIGINAL posting; "Key clarification" is the FINAL confirmed standard.
   - The clarification ALWAYS outranks the original posting, whether it loosens a requirement (e.g. "any verifiable degree" over "full-time bachelor") or tightens one (e.g. "must master Java concurrency" over "familiar with Java").
   - Clarifications often carry hard red lines absent from the posting (mandatory industry background, job-hopping limits); enforce them strictly.

2. Education veto:
   - Degree order: PhD > Master > Bachelor > Associate > High school.
   - Compare the candidate's highest degree against the job's minimum first. When the candidate falls below the bar, that job's score MUST be exactly 0 and comprehensiveEvaluation MUST begin with "[Education mismatch]".
   - When the clarification sets a stricter education bar, the veto follows the clarification.

3. Missing-education veto:
   - A resume with no education history at all scores BELOW 30 on every job (suggest 10-25), and comprehensiveEvaluation MUST begin with "[Education missing]" and note the verification risk.
   - Strong skills or experience never lift this cap.

4. Category-conflict check:
   - Judge whether the candidate's core professional category fundamentally conflicts with the job's target domain (e.g. a salesperson against a pure engineering role).
   - Generic soft skills ("strong communicator", "fast learner") never qualify a non-technical candidate for a hard technical role. On a fundamental conflict with no transition record, score below 10 (suggest 0) and note the category mismatch.

5. Flexible matching:
   - NEVER pad the list with irrelevant jobs. An empty list or all-low scores is acceptable.
   - Order by match quality descending; return AT MOST 3 jobs (0, 1, or 2 are fine).

6. Other rules:
   - jdId in the returned JSON MUST exactly equal a provided job ID.
   - When education and category both pass, score 0-100 across skills, experience, and abilities.

CORE RULES - comprehensiveEvaluation:
- Voice: you are a seasoned recruiting professional writing a screening recommendation for the hiring client; the goal is to get the candidate an interview.
- Never expose the mechanics: no "the resume does not mention", "comparison shows", or any phrasing that reveals document comparison rather than expert judgment.
- No blocking language: never write "lacks X experience" or "falls short in Y"; reframe gaps positively (e.g. "cross-industry architectural experience with low migration cost" instead of "no vertical-industry experience").
- Style: professional, objective, positive, substantive.
- Never open with "The candidate", "This person", or a similar subject; state facts and judgments directly.
- Length: 60-120 words.

Return the result strictly in the requested JSON format."#;

/// One job's block inside `{jd_descriptions}`. Replace `{jd_id}`,
/// `{jd_title}`, `{key_clarification}`, `{responsibilities}`,
/// `{requirements}`.
pub const MATCH_JD_BLOCK: &str = r#"[Job ID: {jd_id}]
Title: {jd_title}
>>> Key clarification (confirmed final standard - highest priority) <<<: {key_clarification}
[Original] Responsibilities: {responsibilities}
[Original] Requirements: {requirements}"#;
