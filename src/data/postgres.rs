use crate::{
    config::DbConfig,
    data::{
        StudentStore,
        student::{NewStudent, Student, StudentPatch},
    },
    error::{
        GetDatabaseConnectionSnafu, MakeQuerySnafu, MigrateSnafu, OpenDatabaseSnafu,
        RollcallError, RollcallResult,
    },
};
use async_trait::async_trait;
use snafu::ResultExt;
use sqlx::{
    Pool, Postgres,
    pool::PoolConnection,
    postgres::PgPoolOptions,
};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct PgStudentStore {
    pool: Pool<Postgres>,
}

impl PgStudentStore {
    pub async fn connect(options: PgPoolOptions, db_config: &DbConfig) -> RollcallResult<Self> {
        let pool = options
            .max_connections(db_config.max_connections())
            .connect(db_config.url())
            .await
            .context(OpenDatabaseSnafu)?;

        sqlx::migrate!().run(&pool).await.context(MigrateSnafu)?;

        Ok(Self { pool })
    }

    async fn get_connection(&self) -> RollcallResult<PoolConnection<Postgres>> {
        self.pool
            .acquire()
            .await
            .context(GetDatabaseConnectionSnafu)
    }
}

/// Unique violations carry the constraint name; turn them into the field the
/// caller actually sent.
fn map_write_error(source: sqlx::Error) -> RollcallError {
    if let sqlx::Error::Database(db_error) = &source {
        if db_error.is_unique_violation() {
            let field = match db_error.constraint() {
                Some("students_email_key") => "email",
                _ => "studentId",
            };
            return RollcallError::DuplicateStudent { field };
        }
    }
    RollcallError::MakeQuery { source }
}

#[async_trait]
impl StudentStore for PgStudentStore {
    async fn insert(&self, to_be_added: NewStudent) -> RollcallResult<Student> {
        let NewStudent {
            student_id,
            name,
            gender,
            date_of_birth,
            email,
            contact_no,
            emergency_contact_no,
            blood_group,
            present_address,
            permanent_address,
            guardian,
            local_guardian,
            profile_img,
            is_active,
        } = to_be_added;

        let mut conn = self.get_connection().await?;

        sqlx::query_as::<_, Student>(
            "INSERT INTO public.students (id, student_id, first_name, middle_name, last_name, \
             gender, date_of_birth, email, contact_no, emergency_contact_no, blood_group, \
             present_address, permanent_address, father_name, father_occupation, \
             father_contact_no, mother_name, mother_occupation, mother_contact_no, \
             local_guardian_name, local_guardian_occupation, local_guardian_contact_no, \
             local_guardian_address, profile_img, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, \
             $17, $18, $19, $20, $21, $22, $23, $24, $25) RETURNING *",
        )
        .bind(Uuid::new_v4())
        .bind(student_id)
        .bind(name.first_name)
        .bind(name.middle_name)
        .bind(name.last_name)
        .bind(gender)
        .bind(date_of_birth)
        .bind(email)
        .bind(contact_no)
        .bind(emergency_contact_no)
        .bind(blood_group)
        .bind(present_address)
        .bind(permanent_address)
        .bind(guardian.father_name)
        .bind(guardian.father_occupation)
        .bind(guardian.father_contact_no)
        .bind(guardian.mother_name)
        .bind(guardian.mother_occupation)
        .bind(guardian.mother_contact_no)
        .bind(local_guardian.name)
        .bind(local_guardian.occupation)
        .bind(local_guardian.contact_no)
        .bind(local_guardian.address)
        .bind(profile_img)
        .bind(is_active)
        .fetch_one(&mut *conn)
        .await
        .map_err(map_write_error)
    }

    async fn get_all(&self) -> RollcallResult<Vec<Student>> {
        sqlx::query_as::<_, Student>("SELECT * FROM public.students ORDER BY created_at, id")
            .fetch_all(&self.pool)
            .await
            .context(MakeQuerySnafu)
    }

    async fn get_by_student_id(&self, student_id: &str) -> RollcallResult<Option<Student>> {
        let mut conn = self.get_connection().await?;
        sqlx::query_as::<_, Student>("SELECT * FROM public.students WHERE student_id = $1")
            .bind(student_id)
            .fetch_optional(&mut *conn)
            .await
            .context(MakeQuerySnafu)
    }

    async fn update_by_student_id(
        &self,
        student_id: &str,
        patch: StudentPatch,
    ) -> RollcallResult<Option<Student>> {
        let StudentPatch {
            student_id: new_student_id,
            name,
            gender,
            date_of_birth,
            email,
            contact_no,
            emergency_contact_no,
            blood_group,
            present_address,
            permanent_address,
            guardian,
            local_guardian,
            profile_img,
            is_active,
        } = patch;

        // a provided name replaces the stored one whole, so middle_name follows first_name
        let (first_name, middle_name, last_name) = match name {
            Some(name) => (Some(name.first_name), name.middle_name, Some(name.last_name)),
            None => (None, None, None),
        };
        let guardian = guardian.map(|g| {
            [
                g.father_name,
                g.father_occupation,
                g.father_contact_no,
                g.mother_name,
                g.mother_occupation,
                g.mother_contact_no,
            ]
        });
        let [
            father_name,
            father_occupation,
            father_contact_no,
            mother_name,
            mother_occupation,
            mother_contact_no,
        ] = guardian.map_or_else(Default::default, |fields| fields.map(Some));
        let local_guardian =
            local_guardian.map(|l| [l.name, l.occupation, l.contact_no, l.address]);
        let [lg_name, lg_occupation, lg_contact_no, lg_address] =
            local_guardian.map_or_else(Default::default, |fields| fields.map(Some));

        let mut conn = self.get_connection().await?;

        sqlx::query_as::<_, Student>(
            "UPDATE public.students SET \
                student_id = COALESCE($2, student_id), \
                first_name = COALESCE($3, first_name), \
                middle_name = CASE WHEN $3::TEXT IS NULL THEN middle_name ELSE $4 END, \
                last_name = COALESCE($5, last_name), \
                gender = COALESCE($6, gender), \
                date_of_birth = COALESCE($7, date_of_birth), \
                email = COALESCE($8, email), \
                contact_no = COALESCE($9, contact_no), \
                emergency_contact_no = COALESCE($10, emergency_contact_no), \
                blood_group = COALESCE($11, blood_group), \
                present_address = COALESCE($12, present_address), \
                permanent_address = COALESCE($13, permanent_address), \
                father_name = COALESCE($14, father_name), \
                father_occupation = COALESCE($15, father_occupation), \
                father_contact_no = COALESCE($16, father_contact_no), \
                mother_name = COALESCE($17, mother_name), \
                mother_occupation = COALESCE($18, mother_occupation), \
                mother_contact_no = COALESCE($19, mother_contact_no), \
                local_guardian_name = COALESCE($20, local_guardian_name), \
                local_guardian_occupation = COALESCE($21, local_guardian_occupation), \
                local_guardian_contact_no = COALESCE($22, local_guardian_contact_no), \
                local_guardian_address = COALESCE($23, local_guardian_address), \
                profile_img = COALESCE($24, profile_img), \
                is_active = COALESCE($25, is_active), \
                updated_at = now() \
             WHERE student_id = $1 RETURNING *",
        )
        .bind(student_id)
        .bind(new_student_id)
        .bind(first_name)
        .bind(middle_name)
        .bind(last_name)
        .bind(gender)
        .bind(date_of_birth)
        .bind(email)
        .bind(contact_no)
        .bind(emergency_contact_no)
        .bind(blood_group)
        .bind(present_address)
        .bind(permanent_address)
        .bind(father_name)
        .bind(father_occupation)
        .bind(father_contact_no)
        .bind(mother_name)
        .bind(mother_occupation)
        .bind(mother_contact_no)
        .bind(lg_name)
        .bind(lg_occupation)
        .bind(lg_contact_no)
        .bind(lg_address)
        .bind(profile_img)
        .bind(is_active)
        .fetch_optional(&mut *conn)
        .await
        .map_err(map_write_error)
    }

    async fn remove_by_student_id(&self, student_id: &str) -> RollcallResult<Option<Student>> {
        let mut conn = self.get_connection().await?;
        sqlx::query_as::<_, Student>(
            "DELETE FROM public.students WHERE student_id = $1 RETURNING *",
        )
        .bind(student_id)
        .fetch_optional(&mut *conn)
        .await
        .context(MakeQuerySnafu)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}
