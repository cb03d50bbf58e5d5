//! The fixed question set used to compare the pipelines.

/// Five questions about *Os Sertões*, asked of every pipeline in order.
pub const QUESTIONS: [&str; 5] = [
    "What is Euclides da Cunha's vision of the natural environment of the northeastern sertão and how does it influence the lives of the inhabitants?",
    "How does the author describe the sertanejo, and what does he mean by calling him \"above all, a strong man\"?",
    "What role does Antônio Conselheiro play in the formation of the Canudos settlement?",
    "How does the book portray the military campaigns against Canudos and the conduct of the Republican army?",
    "What criticism of Brazilian society and of the coastal elites emerges from the account of the war?",
];
