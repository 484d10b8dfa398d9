// Cross-cutting prompt fragments.
// Each service that needs AI calls defines its own prompts.rs alongside it;
// this file holds the instructions shared across call sites.

/// Vision instruction for scanned-document OCR.
pub const OCR_INSTRUCTION: &str = "These images are scanned pages of a document. \
    Extract ALL text content from the images, completely and accurately. \
    Preserve the original paragraph structure. \
    If a page contains a table, reconstruct it as plain text.";
