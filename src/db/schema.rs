//! `$jsonSchema` validators applied to each collection at setup.

use bson::{doc, Document};

use crate::db::types::{CourseLevel, EnrollmentStatus, UserRole};
use crate::db::{ASSIGNMENTS, COURSES, ENROLLMENTS, USERS};

pub(crate) const EMAIL_PATTERN: &str = r"^[\w.-]+@[\w.-]+\.[a-zA-Z]{2,}$";

/// Store-side validation level: existing non-conforming documents are left alone,
/// inserts and updates are checked.
pub(crate) const VALIDATION_LEVEL: &str = "moderate";

pub(crate) fn user_schema() -> Document {
    doc! {
        "$jsonSchema": {
            "bsonType": "object",
            "required": ["userId", "email", "firstName", "lastName", "role", "dateJoined", "isActive"],
            "properties": {
                "_id": { "bsonType": "objectId" },
                "userId": { "bsonType": "string", "description": "Unique user identifier" },
                "email": {
                    "bsonType": "string",
                    "pattern": EMAIL_PATTERN,
                    "description": "Valid email address",
                },
                "firstName": { "bsonType": "string" },
                "lastName": { "bsonType": "string" },
                "role": { "enum": UserRole::ALL.to_vec() },
                "dateJoined": { "bsonType": "date" },
                "profile": {
                    "bsonType": "object",
                    "properties": {
                        "bio": { "bsonType": "string" },
                        "avatar": { "bsonType": "string" },
                        "skills": { "bsonType": "array", "items": { "bsonType": "string" } },
                    },
                },
                "isActive": { "bsonType": "bool" },
            },
        }
    }
}

pub(crate) fn course_schema() -> Document {
    doc! {
        "$jsonSchema": {
            "bsonType": "object",
            "required": [
                "courseId", "title", "instructorId", "level",
                "duration", "price", "createdAt", "isPublished",
            ],
            "properties": {
                "_id": { "bsonType": "objectId" },
                "courseId": { "bsonType": "string", "description": "Unique course identifier" },
                "title": { "bsonType": "string" },
                "description": { "bsonType": "string" },
                "instructorId": { "bsonType": "string", "description": "Instructor's userId" },
                "category": { "bsonType": "string" },
                "level": { "enum": CourseLevel::ALL.to_vec() },
                "duration": { "bsonType": "int", "minimum": 1, "description": "Hours" },
                "price": { "bsonType": ["double", "int"], "minimum": 0 },
                "tags": { "bsonType": "array", "items": { "bsonType": "string" } },
                "createdAt": { "bsonType": "date" },
                "updatedAt": { "bsonType": "date" },
                "isPublished": { "bsonType": "bool" },
            },
        }
    }
}

pub(crate) fn enrollment_schema() -> Document {
    doc! {
        "$jsonSchema": {
            "bsonType": "object",
            "required": ["enrollmentId", "userId", "courseId", "enrolledAt", "status"],
            "properties": {
                "_id": { "bsonType": "objectId" },
                "enrollmentId": { "bsonType": "string" },
                "userId": { "bsonType": "string" },
                "courseId": { "bsonType": "string" },
                "enrolledAt": { "bsonType": "date" },
                "status": { "enum": EnrollmentStatus::ALL.to_vec() },
                "progress": { "bsonType": "double", "minimum": 0, "maximum": 100 },
            },
        }
    }
}

pub(crate) fn assignment_schema() -> Document {
    doc! {
        "$jsonSchema": {
            "bsonType": "object",
            "required": ["assignmentId", "courseId", "title", "dueDate"],
            "properties": {
                "_id": { "bsonType": "objectId" },
                "assignmentId": { "bsonType": "string" },
                "courseId": { "bsonType": "string" },
                "title": { "bsonType": "string" },
                "description": { "bsonType": "string" },
                "dueDate": { "bsonType": "date" },
                "maxPoints": { "bsonType": "int", "minimum": 0 },
            },
        }
    }
}

/// Collections that carry a validator, paired with the validator document.
pub(crate) fn validated_collections() -> Vec<(&'static str, Document)> {
    vec![
        (USERS, user_schema()),
        (COURSES, course_schema()),
        (ENROLLMENTS, enrollment_schema()),
        (ASSIGNMENTS, assignment_schema()),
    ]
}

pub(crate) fn coll_mod_command(collection: &str, validator: Document) -> Document {
    doc! {
        "collMod": collection,
        "validator": validator,
        "validationLevel": VALIDATION_LEVEL,
    }
}
