use mongodb::Database;
use serde::Serialize;

use crate::core::time::{days_ago, now_utc};
use crate::db::models::{Assignment, AssignmentSubmission, Course, Enrollment, User, UserProfile};
use crate::db::types::{CourseLevel, EnrollmentStatus, UserRole};
use crate::repositories::{self, counters};
use crate::services::enrollments::format_enrollment_id;

pub(crate) const DEFAULT_USER_COUNT: u32 = 20;
const FIRST_STUDENT: u32 = 3;

struct SampleCourse {
    course_id: &'static str,
    title: &'static str,
    description: &'static str,
    instructor_id: &'static str,
    category: &'static str,
    level: CourseLevel,
    duration: i32,
    price: f64,
    tags: &'static [&'static str],
}

const SAMPLE_COURSES: &[SampleCourse] = &[
    SampleCourse {
        course_id: "C001",
        title: "Python for Beginners",
        description: "Learn Python from scratch",
        instructor_id: "U001",
        category: "Programming",
        level: CourseLevel::Beginner,
        duration: 20,
        price: 50.0,
        tags: &["python", "programming"],
    },
    SampleCourse {
        course_id: "C002",
        title: "Data Analysis with Excel",
        description: "Master Excel for data analysis",
        instructor_id: "U002",
        category: "Data Analysis",
        level: CourseLevel::Intermediate,
        duration: 15,
        price: 40.0,
        tags: &["excel", "data"],
    },
    SampleCourse {
        course_id: "C003",
        title: "Machine Learning Fundamentals",
        description: "Introduction to ML concepts",
        instructor_id: "U001",
        category: "AI/ML",
        level: CourseLevel::Intermediate,
        duration: 30,
        price: 80.0,
        tags: &["machine learning", "ai"],
    },
    SampleCourse {
        course_id: "C004",
        title: "Web Development Fundamentals",
        description: "Learn HTML, CSS, and JavaScript",
        instructor_id: "U002",
        category: "Web Development",
        level: CourseLevel::Beginner,
        duration: 25,
        price: 60.0,
        tags: &["html", "css", "javascript"],
    },
    SampleCourse {
        course_id: "C005",
        title: "Advanced Python",
        description: "Deep dive into Python",
        instructor_id: "U001",
        category: "Programming",
        level: CourseLevel::Advanced,
        duration: 35,
        price: 100.0,
        tags: &["python", "advanced"],
    },
];

/// Which sample sets made it into the store. A failed batch is logged, not raised.
#[derive(Debug, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PopulationSummary {
    pub(crate) users: bool,
    pub(crate) courses: bool,
    pub(crate) enrollments: bool,
    pub(crate) assignments: bool,
    pub(crate) submissions: bool,
}

/// Inserts two instructors, students `U003..=U{count}`, five published courses and a
/// handful of enrollments, assignments and graded submissions.
pub(crate) async fn populate(db: &Database, count: u32) -> PopulationSummary {
    let users = sample_users(count);
    let courses = sample_courses();
    let assignments = sample_assignments();

    let mut summary = PopulationSummary {
        users: insert_batch("users", repositories::users::insert_many(db, &users).await),
        courses: insert_batch("courses", repositories::courses::insert_many(db, &courses).await),
        assignments: insert_batch(
            "assignments",
            repositories::assignments::insert_many(db, &assignments).await,
        ),
        ..PopulationSummary::default()
    };

    let students: Vec<&User> = users.iter().filter(|u| u.role == UserRole::Student).collect();
    let enrollments = match sample_enrollments(db, &students).await {
        Ok(enrollments) => enrollments,
        Err(err) => {
            tracing::error!(error = %err, "Error allocating enrollment ids");
            Vec::new()
        }
    };
    if !enrollments.is_empty() {
        summary.enrollments = insert_batch(
            "enrollments",
            repositories::enrollments::insert_many(db, &enrollments).await,
        );
    }

    let submissions = sample_submissions(&enrollments);
    if !submissions.is_empty() {
        summary.submissions = insert_batch(
            "assignment_submissions",
            repositories::submissions::insert_many(db, &submissions).await,
        );
    }

    summary
}

fn insert_batch(collection: &str, result: Result<usize, mongodb::error::Error>) -> bool {
    match result {
        Ok(inserted) => {
            tracing::info!(collection, inserted, "Inserted sample documents");
            true
        }
        Err(err) => {
            tracing::error!(collection, error = %err, "Error populating collection");
            false
        }
    }
}

fn sample_users(count: u32) -> Vec<User> {
    let instructors = [
        ("U001", "Sarah", "Johnson", "sarah.johnson@eduhub.com"),
        ("U002", "Mark", "Smith", "mark.smith@eduhub.com"),
    ];

    let mut users: Vec<User> = instructors
        .into_iter()
        .map(|(user_id, first, last, email)| {
            sample_user(user_id.to_string(), first, last, email.to_string(), UserRole::Instructor)
        })
        .collect();

    for i in FIRST_STUDENT..=count {
        users.push(sample_user(
            format!("U{i:03}"),
            &format!("Student{i}"),
            &format!("LastName{i}"),
            format!("student{i}@example.com"),
            UserRole::Student,
        ));
    }

    users
}

fn sample_user(user_id: String, first: &str, last: &str, email: String, role: UserRole) -> User {
    User {
        id: None,
        user_id,
        email,
        first_name: first.to_string(),
        last_name: last.to_string(),
        role,
        date_joined: now_utc(),
        profile: Some(UserProfile {
            bio: Some(format!("Bio for {first}")),
            avatar: None,
            skills: vec!["Python".to_string(), "MongoDB".to_string()],
        }),
        is_active: true,
    }
}

fn sample_courses() -> Vec<Course> {
    let now = now_utc();
    SAMPLE_COURSES
        .iter()
        .map(|sample| Course {
            id: None,
            course_id: sample.course_id.to_string(),
            title: sample.title.to_string(),
            description: Some(sample.description.to_string()),
            instructor_id: sample.instructor_id.to_string(),
            category: Some(sample.category.to_string()),
            level: sample.level,
            duration: sample.duration,
            price: sample.price,
            tags: sample.tags.iter().map(|tag| tag.to_string()).collect(),
            created_at: now,
            updated_at: now,
            is_published: true,
        })
        .collect()
}

fn assignment_id_for(course_id: &str) -> String {
    format!("A{}", course_id.trim_start_matches('C'))
}

fn sample_assignments() -> Vec<Assignment> {
    let due_date = days_ago(7);
    SAMPLE_COURSES
        .iter()
        .map(|sample| Assignment {
            id: None,
            assignment_id: assignment_id_for(sample.course_id),
            course_id: sample.course_id.to_string(),
            title: format!("{} Project", sample.title),
            description: Some(format!("Final project for {}", sample.title)),
            due_date,
            max_points: Some(100),
        })
        .collect()
}

/// One enrollment per student spread across the sample courses, plus a second course for
/// every other student. Every fourth enrollment is already completed.
async fn sample_enrollments(
    db: &Database,
    students: &[&User],
) -> Result<Vec<Enrollment>, mongodb::error::Error> {
    let mut enrollments = Vec::new();

    for (index, student) in students.iter().enumerate() {
        let mut picks = vec![index % SAMPLE_COURSES.len()];
        if index % 2 == 0 {
            picks.push((index + 2) % SAMPLE_COURSES.len());
        }

        for pick in picks {
            let position = enrollments.len();
            let status = if position % 4 == 3 {
                EnrollmentStatus::Completed
            } else {
                EnrollmentStatus::Active
            };
            let progress = match status {
                EnrollmentStatus::Completed => 100.0,
                _ => ((position * 15) % 90) as f64,
            };
            let sequence = counters::next_value(db, counters::ENROLLMENT_SEQUENCE).await?;

            enrollments.push(Enrollment {
                id: None,
                enrollment_id: format_enrollment_id(sequence),
                user_id: student.user_id.clone(),
                course_id: SAMPLE_COURSES[pick].course_id.to_string(),
                enrolled_at: days_ago((position as i64 * 11) % 180),
                status,
                progress,
            });
        }
    }

    Ok(enrollments)
}

fn sample_submissions(enrollments: &[Enrollment]) -> Vec<AssignmentSubmission> {
    enrollments
        .iter()
        .enumerate()
        .map(|(index, enrollment)| AssignmentSubmission {
            id: None,
            submission_id: format!("S{:03}", index + 1),
            assignment_id: assignment_id_for(&enrollment.course_id),
            user_id: enrollment.user_id.clone(),
            submitted_at: days_ago(8),
            grade: Some(60.0 + ((index * 7) % 40) as f64),
            feedback: Some("Good work".to_string()),
        })
        .collect()
}
