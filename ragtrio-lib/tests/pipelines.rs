//! Runs the three pipelines end to end over a synthetic document, with
//! in-process stand-ins for the hosted services.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Mutex};

use ragtrio_lib::embed::{Embedder, Embedding};
use ragtrio_lib::generate::{GenerationRequest, Generator};
use ragtrio_lib::load::Page;
use ragtrio_lib::pipeline::{build_retriever, Pipeline, PipelineKind};
use ragtrio_lib::questions::QUESTIONS;
use ragtrio_lib::rerank::{RerankScore, Reranker};
use ragtrio_lib::Result;

const DIMENSION: usize = 64;

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 2)
        .map(str::to_lowercase)
}

/// Hashed bag of words
struct HashingEmbedder;

impl HashingEmbedder {
    fn embed(text: &str) -> Embedding {
        let mut vector = vec![0.0; DIMENSION];
        for word in words(text) {
            let mut hasher = DefaultHasher::new();
            word.hash(&mut hasher);
            vector[(hasher.finish() % DIMENSION as u64) as usize] += 1.0;
        }
        vector
    }
}

impl Embedder for HashingEmbedder {
    fn embed_documents(&mut self, texts: &[&str]) -> Result<Vec<Embedding>> {
        Ok(texts.iter().map(|t| Self::embed(t)).collect())
    }

    fn embed_query(&mut self, text: &str) -> Result<Embedding> {
        Ok(Self::embed(text))
    }

    fn dimension(&self) -> Option<usize> {
        Some(DIMENSION)
    }

    fn model_name(&self) -> &str {
        "hashing"
    }
}

/// Fraction of query words present in the document
struct WordOverlapReranker;

impl Reranker for WordOverlapReranker {
    fn score(&mut self, query: &str, documents: &[&str], _top_n: usize) -> Result<Vec<RerankScore>> {
        let query: HashSet<String> = words(query).collect();
        Ok(documents
            .iter()
            .enumerate()
            .map(|(index, doc)| {
                let doc: HashSet<String> = words(doc).collect();
                let shared = query.intersection(&doc).count();
                RerankScore {
                    index,
                    score: shared as f32 / query.len().max(1) as f32,
                }
            })
            .collect())
    }

    fn model_name(&self) -> &str {
        "word-overlap"
    }
}

#[derive(Default)]
struct RecordingGenerator {
    requests: Mutex<Vec<(String, usize)>>,
}

impl Generator for RecordingGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<String> {
        self.requests
            .lock()
            .unwrap()
            .push((request.prompt.to_string(), request.max_tokens));
        Ok(format!("An answer drawn from {} characters of prompt.", request.prompt.len()))
    }

    fn model_name(&self) -> &str {
        "recording"
    }
}

const TOPICS: [&str; 4] = [
    "The northeastern sertão is a hard land of drought, where the caatinga withers under the sun \
     and the inhabitants shape their lives around the rare rains and the dry rivers. ",
    "The sertanejo is above all a strong man, a vaqueiro who rides through thorny scrub after the \
     cattle, tireless in the saddle and patient through every season. ",
    "Antônio Conselheiro gathered pilgrims at Canudos, and the settlement grew on the banks of the \
     Vaza-Barris as the faithful built houses and a church around him. ",
    "The Republican army sent expedition after expedition against Canudos, and the campaigns ended \
     in a siege that the author judged a crime of the coastal nation. ",
];

/// Twelve pages of roughly five thousand characters each
fn document() -> Vec<Page> {
    (0..12)
        .map(|index| {
            let topic = TOPICS[index % TOPICS.len()];
            let mut content = format!("Page {}. ", index + 1);
            while content.chars().count() < 5000 {
                content.push_str(topic);
            }
            Page {
                index,
                source: "os_sertoes_synthetic.pdf".to_string(),
                content,
            }
        })
        .collect()
}

fn pipeline(kind: PipelineKind, generator: Arc<RecordingGenerator>) -> Pipeline {
    let reranker: Option<Box<dyn Reranker>> = Some(Box::new(WordOverlapReranker));
    let retriever = build_retriever(kind, Box::new(HashingEmbedder), reranker).unwrap();
    Pipeline::new(kind, retriever, Box::new(generator))
}

#[test]
fn test_every_pipeline_answers_the_sertao_question() {
    let pages = document();
    let question = QUESTIONS[0];

    for (kind, bound) in [
        (PipelineKind::Naive, 200),
        (PipelineKind::Parent, 200),
        (PipelineKind::Rerank, 500),
    ] {
        let generator = Arc::new(RecordingGenerator::default());
        let mut pipeline = pipeline(kind, generator.clone());
        let stats = pipeline.index(&pages).unwrap();
        assert!(stats.embedded > 0, "{kind} indexed nothing");

        let answer = pipeline.answer(question).unwrap();
        assert!(!answer.text.is_empty(), "{kind} gave an empty answer");
        assert!(!answer.context.is_empty(), "{kind} retrieved no context");
        for result in &answer.context {
            assert!(
                pages.iter().any(|p| p.content.contains(&result.chunk.content)),
                "{kind} returned context that is not from the document"
            );
        }

        let requests = generator.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].0.contains(question));
        assert_eq!(requests[0].1, bound, "{kind} used the wrong output bound");
    }
}

#[test]
fn test_context_sizes() {
    let pages = document();
    let question = "How did the army campaigns against Canudos end?";

    let mut naive = pipeline(PipelineKind::Naive, Arc::default());
    naive.index(&pages).unwrap();
    let context = naive.retrieve(question).unwrap();
    assert_eq!(context.len(), 3);
    for pair in context.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }

    let mut parent = pipeline(PipelineKind::Parent, Arc::default());
    parent.index(&pages).unwrap();
    let context = parent.retrieve(question).unwrap();
    let ids: HashSet<_> = context.iter().map(|r| &r.chunk.id).collect();
    assert!((1..=4).contains(&context.len()));
    assert_eq!(ids.len(), context.len());
    // parents are the large chunks
    assert!(context.iter().all(|r| r.chunk.content.chars().count() > 200));

    let mut rerank = pipeline(PipelineKind::Rerank, Arc::default());
    rerank.index(&pages).unwrap();
    let context = rerank.retrieve(question).unwrap();
    assert_eq!(context.len(), 3);
    for pair in context.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }
}

#[test]
fn test_reindexing_gives_the_same_ranking() {
    let pages = document();

    for kind in PipelineKind::ALL {
        let mut pipeline = pipeline(kind, Arc::default());
        pipeline.index(&pages).unwrap();
        let first: Vec<_> = pipeline
            .retrieve(QUESTIONS[2])
            .unwrap()
            .into_iter()
            .map(|r| r.chunk.id)
            .collect();

        pipeline.index(&pages).unwrap();
        let second: Vec<_> = pipeline
            .retrieve(QUESTIONS[2])
            .unwrap()
            .into_iter()
            .map(|r| r.chunk.id)
            .collect();

        assert_eq!(first, second, "{kind} ranking changed after reindexing");
    }
}

#[test]
fn test_snapshot_is_reused() {
    let pages = document();
    let dir = tempfile::tempdir().unwrap();

    for kind in PipelineKind::ALL {
        let mut built = pipeline(kind, Arc::default());
        let stats = built.index_cached(&pages, dir.path()).unwrap();

        let mut restored = pipeline(kind, Arc::default());
        let again = restored.index_cached(&pages, dir.path()).unwrap();
        assert_eq!(again, stats);

        let expected: Vec<_> = built.retrieve(QUESTIONS[1]).unwrap().into_iter().map(|r| r.chunk).collect();
        let actual: Vec<_> = restored.retrieve(QUESTIONS[1]).unwrap().into_iter().map(|r| r.chunk).collect();
        assert_eq!(expected, actual);
    }
}

#[test]
fn test_snapshot_belongs_to_its_document() {
    let dir = tempfile::tempdir().unwrap();
    let book_a = document();
    let book_b: Vec<Page> = document()
        .into_iter()
        .map(|mut page| {
            page.source = "dom_casmurro_synthetic.pdf".to_string();
            page.content = page.content.replace("Canudos", "Matacavalos");
            page
        })
        .collect();

    for kind in PipelineKind::ALL {
        let mut first = pipeline(kind, Arc::default());
        first.index_cached(&book_a, dir.path()).unwrap();

        let mut second = pipeline(kind, Arc::default());
        second.index_cached(&book_b, dir.path()).unwrap();

        let context = second.retrieve(QUESTIONS[3]).unwrap();
        assert!(!context.is_empty());
        for result in &context {
            assert_eq!(
                result.chunk.metadata.source_id.as_deref(),
                Some("dom_casmurro_synthetic.pdf"),
                "{kind} answered from another document's snapshot"
            );
        }
    }
}
