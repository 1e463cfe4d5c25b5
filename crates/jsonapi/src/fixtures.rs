//! Record types shared by the unit tests.

use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use crate::model::Links;
use crate::schema::{Field, Resource};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Blog {
    pub id: i64,
    pub client_id: String,
    pub title: String,
    pub posts: Vec<Post>,
    pub current_post: Option<Box<Post>>,
    pub current_post_id: i64,
    pub created_at: DateTime<Utc>,
    pub view_count: i64,
}

impl Resource for Blog {
    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::primary("primary,blogs", |b: &Blog| &b.id, |b| &mut b.id),
            Field::client_id("client-id", |b: &Blog| &b.client_id, |b| &mut b.client_id),
            Field::attr("attr,title", |b: &Blog| &b.title, |b| &mut b.title),
            Field::to_many("relation,posts", |b: &Blog| &b.posts, |b| &mut b.posts),
            Field::to_one("relation,current_post", |b: &Blog| &b.current_post, |b| {
                &mut b.current_post
            }),
            Field::attr("attr,current_post_id", |b: &Blog| &b.current_post_id, |b| {
                &mut b.current_post_id
            }),
            Field::attr("attr,created_at", |b: &Blog| &b.created_at, |b| &mut b.created_at),
            Field::attr("attr,view_count", |b: &Blog| &b.view_count, |b| &mut b.view_count),
        ]
    }

    fn links(&self) -> Option<Links> {
        if self.id == 0 {
            return None;
        }
        let mut links = Links::new();
        links.insert("self".into(), json!(format!("https://example.com/blogs/{}", self.id)));
        Some(links)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Post {
    pub id: u64,
    pub client_id: String,
    pub blog_id: i64,
    pub title: String,
    pub body: String,
    pub comments: Vec<Comment>,
    pub latest_comment: Option<Box<Comment>>,
}

impl Resource for Post {
    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::primary("primary,posts", |p: &Post| &p.id, |p| &mut p.id),
            Field::client_id("client-id", |p: &Post| &p.client_id, |p| &mut p.client_id),
            Field::attr("attr,blog_id", |p: &Post| &p.blog_id, |p| &mut p.blog_id),
            Field::attr("attr,title", |p: &Post| &p.title, |p| &mut p.title),
            Field::attr("attr,body", |p: &Post| &p.body, |p| &mut p.body),
            Field::to_many("relation,comments", |p: &Post| &p.comments, |p| &mut p.comments),
            Field::to_one("relation,latest_comment", |p: &Post| &p.latest_comment, |p| {
                &mut p.latest_comment
            }),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Comment {
    pub id: i64,
    pub client_id: String,
    pub post_id: i64,
    pub body: String,
}

impl Resource for Comment {
    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::primary("primary,comments", |c: &Comment| &c.id, |c| &mut c.id),
            Field::client_id("client-id", |c: &Comment| &c.client_id, |c| &mut c.client_id),
            Field::attr("attr,post_id", |c: &Comment| &c.post_id, |c| &mut c.post_id),
            Field::attr("attr,body", |c: &Comment| &c.body, |c| &mut c.body),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WithPointer {
    pub id: Option<u64>,
    pub name: Option<String>,
    pub is_active: Option<bool>,
    pub int_val: Option<i32>,
    pub float_val: Option<f32>,
}

impl Resource for WithPointer {
    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::primary("primary,with-pointers,with-pointers", |w: &WithPointer| &w.id, |w| {
                &mut w.id
            }),
            Field::attr("attr,name", |w: &WithPointer| &w.name, |w| &mut w.name),
            Field::attr("attr,is-active", |w: &WithPointer| &w.is_active, |w| &mut w.is_active),
            Field::attr("attr,int-val", |w: &WithPointer| &w.int_val, |w| &mut w.int_val),
            Field::attr("attr,float-val", |w: &WithPointer| &w.float_val, |w| &mut w.float_val),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timestamp {
    pub id: i64,
    pub time: DateTime<Utc>,
    pub next: Option<DateTime<Utc>>,
}

impl Resource for Timestamp {
    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::primary("primary,timestamps", |t: &Timestamp| &t.id, |t| &mut t.id),
            Field::attr("attr,timestamp,iso8601", |t: &Timestamp| &t.time, |t| &mut t.time),
            Field::attr("attr,next,iso8601", |t: &Timestamp| &t.next, |t| &mut t.next),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Book {
    pub id: u64,
    pub author: String,
    pub isbn: String,
    pub title: String,
    pub description: Option<String>,
    pub pages: Option<u32>,
    pub published_at: DateTime<Utc>,
    pub tags: Vec<String>,
    pub extra: Value,
}

impl Resource for Book {
    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::primary("primary,books", |b: &Book| &b.id, |b| &mut b.id),
            Field::attr("attr,author", |b: &Book| &b.author, |b| &mut b.author),
            Field::attr("attr,isbn", |b: &Book| &b.isbn, |b| &mut b.isbn),
            Field::attr("attr,title,omitempty", |b: &Book| &b.title, |b| &mut b.title),
            Field::attr("attr,description", |b: &Book| &b.description, |b| &mut b.description),
            Field::attr("attr,pages,omitempty", |b: &Book| &b.pages, |b| &mut b.pages),
            Field::attr("attr,published", |b: &Book| &b.published_at, |b| &mut b.published_at),
            Field::attr("attr,tags", |b: &Book| &b.tags, |b| &mut b.tags),
            Field::attr("attr,extra,omitempty", |b: &Book| &b.extra, |b| &mut b.extra),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelBadTypes {
    pub id: String,
    pub string_field: String,
    pub float_field: f64,
    pub time_field: DateTime<Utc>,
    pub time_ptr_field: Option<DateTime<Utc>>,
}

impl Resource for ModelBadTypes {
    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::primary("primary,badtypes", |m: &ModelBadTypes| &m.id, |m| &mut m.id),
            Field::attr("attr,string_field", |m: &ModelBadTypes| &m.string_field, |m| {
                &mut m.string_field
            }),
            Field::attr("attr,float_field", |m: &ModelBadTypes| &m.float_field, |m| {
                &mut m.float_field
            }),
            Field::attr("attr,time_field", |m: &ModelBadTypes| &m.time_field, |m| {
                &mut m.time_field
            }),
            Field::attr("attr,time_ptr_field", |m: &ModelBadTypes| &m.time_ptr_field, |m| {
                &mut m.time_ptr_field
            }),
        ]
    }
}

/// Identity tag without a resource type.
#[derive(Debug, Default)]
pub struct BadModel {
    pub id: i64,
}

impl Resource for BadModel {
    fn fields() -> Vec<Field<Self>> {
        vec![Field::primary("primary", |b: &BadModel| &b.id, |b| &mut b.id)]
    }
}

#[derive(Debug, Default)]
pub struct NoPrimary {
    pub name: String,
}

impl Resource for NoPrimary {
    fn fields() -> Vec<Field<Self>> {
        vec![Field::attr("attr,name", |n: &NoPrimary| &n.name, |n| &mut n.name)]
    }
}

#[derive(Debug, Default)]
pub struct TwoPrimaries {
    pub id: i64,
    pub other: String,
}

impl Resource for TwoPrimaries {
    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::primary("primary,things", |t: &TwoPrimaries| &t.id, |t| &mut t.id),
            Field::primary("primary,others", |t: &TwoPrimaries| &t.other, |t| &mut t.other),
        ]
    }
}

#[derive(Debug, Default)]
pub struct DuplicateName {
    pub id: i64,
    pub name: String,
    pub alias: String,
}

impl Resource for DuplicateName {
    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::primary("primary,things", |d: &DuplicateName| &d.id, |d| &mut d.id),
            Field::attr("attr,name", |d: &DuplicateName| &d.name, |d| &mut d.name),
            Field::attr("attr,name", |d: &DuplicateName| &d.alias, |d| &mut d.alias),
        ]
    }
}

/// Authors and notes refer to each other.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Person {
    pub id: i64,
    pub name: String,
    pub notes: Vec<Note>,
}

impl Resource for Person {
    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::primary("primary,people", |p: &Person| &p.id, |p| &mut p.id),
            Field::attr("attr,name,omitempty", |p: &Person| &p.name, |p| &mut p.name),
            Field::to_many("relation,notes", |p: &Person| &p.notes, |p| &mut p.notes),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Note {
    pub id: i64,
    pub body: String,
    pub author: Option<Box<Person>>,
}

impl Resource for Note {
    fn fields() -> Vec<Field<Self>> {
        vec![
            Field::primary("primary,notes", |n: &Note| &n.id, |n| &mut n.id),
            Field::attr("attr,body,omitempty", |n: &Note| &n.body, |n| &mut n.body),
            Field::to_one("relation,author", |n: &Note| &n.author, |n| &mut n.author),
        ]
    }
}
